use serde_json::Value;

use super::format_cell;

/// Headline figure of each calculator, in priority order.
const PRIORITY_KEYS: [&str; 10] = [
    "emi",
    "future_value",
    "nominal_future_value",
    "corpus_required",
    "final_year_prediction",
    "lowest_total_interest",
    "total_interest_paid",
    "principal",
    "annual_rate_pct",
    "tenure_months",
];

/// Print just the headline value from the output.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    // The four-way solver reports every field; print the one it solved
    if let Some(Value::String(target)) = result.get("solved_for") {
        let key = match target.as_str() {
            "interest_rate" => "annual_rate_pct",
            "tenure" => "tenure_months",
            other => other,
        };
        if let Some(val) = result.get(key) {
            println!("{}", format_cell(val));
            return;
        }
    }

    if let Value::Object(map) = result {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_cell(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_cell(val));
            return;
        }
    }

    println!("{}", format_cell(result));
}
