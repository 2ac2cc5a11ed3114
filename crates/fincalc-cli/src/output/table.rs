use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_cell, row_table};

/// Print the summary, then the row table, then warnings and methodology.
pub fn print_table(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    match result.get("summary") {
        Some(Value::Array(fields)) => print_summary(fields),
        _ => print_flat_object(result),
    }

    if let Some((name, rows)) = row_table(result) {
        println!("\n{}:", name);
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_summary(fields: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for field in fields {
        let label = field.get("label").map(format_cell).unwrap_or_default();
        let value = field.get("value").map(format_cell).unwrap_or_default();
        builder.push_record([label, value]);
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map.iter().filter(|(_, v)| !v.is_array()) {
            builder.push_record([key.as_str(), &format_cell(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            println!("{}", format_cell(row));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            builder.push_record(record);
        }
    }
    println!("{}", Table::from(builder));
}
