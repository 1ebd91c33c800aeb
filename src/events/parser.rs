//! Event log CSV parsing.
//!
//! Event log file bodies are plain CSV with a header row naming the
//! columns (USER_ID, CPU_TIME, ...). Every cell is kept as a string field
//! on the record; the aggregation pipeline parses numerics on demand.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde_json::Value;
use std::io::Read;

use crate::pipeline::Record;

/// Parses one event log CSV body into records keyed by the header row.
pub fn parse_csv(reader: impl Read) -> Result<Vec<Record>> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read event log CSV header")?
        .clone();

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to parse event log CSV row {}", index + 1))?;
        let mut record = Record::new();
        for (header, field) in headers.iter().zip(row.iter()) {
            record.insert(header.to_string(), Value::String(field.to_string()));
        }
        records.push(record);
    }

    Ok(records)
}
