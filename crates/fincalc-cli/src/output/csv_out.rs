use serde_json::Value;
use std::io;

use super::{format_cell, row_table};

/// Write the calculator's row table as CSV, or a field/value listing of the
/// scalar results when there is none.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);
    if let Some((_, rows)) = row_table(result) {
        write_rows(&mut wtr, rows);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            if !val.is_array() {
                let _ = wtr.write_record([key.as_str(), &format_cell(val)]);
            }
        }
    } else {
        let _ = wtr.write_record([&format_cell(result)]);
    }

    if let Err(e) = wtr.flush() {
        tracing::warn!(error = %e, "failed to flush CSV output");
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            let _ = wtr.write_record([&format_cell(row)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}
