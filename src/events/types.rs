//! Data structures for Salesforce Event Monitoring responses.
//!
//! These types mirror the JSON shapes returned by the REST API, enabling
//! direct deserialization with serde.

use serde::Deserialize;

/// One `EventLogFile` row as returned by a SOQL query.
///
/// An event log file is the unit of Event Monitoring delivery: one CSV of
/// log records for a single event type and log date.
///
/// # Fields
///
/// - `id`: record ID, used to download the CSV body
/// - `event_type`: e.g. "API", "Login", "ApexExecution", "VisualforceRequest"
/// - `log_date`: ISO 8601 timestamp of the covered day (or hour)
/// - `log_file_length`: body size in bytes
/// - `interval`: "Daily" or "Hourly"; absent on older API versions
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogFileMeta {
    pub id: String,
    pub event_type: String,
    pub log_date: String,
    pub log_file_length: f64,
    #[serde(default)]
    pub interval: Option<String>,
}

/// Envelope around SOQL query results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse<T> {
    pub total_size: i64,
    pub done: bool,
    pub records: Vec<T>,
    #[serde(default)]
    pub next_records_url: Option<String>,
}

/// One `User` row from the name-resolution query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub username: String,
}
