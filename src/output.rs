// Report export and console previews.
//
// Full tables go to CSV/JSON files; the console only ever shows the head of
// a table as a markdown preview. Write failures are reported by the caller
// and never abort report generation.
use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

/// Export report rows to a CSV file, one row struct per line.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    log::debug!("wrote {} rows to {}", rows.len(), path);
    Ok(())
}

/// Export a serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    log::debug!("wrote {}", path);
    Ok(())
}

/// Print the first `max_rows` rows as a markdown table.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
