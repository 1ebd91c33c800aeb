//! Where report records come from.
//!
//! Online runs list `EventLogFile` rows over SOQL, download each body
//! concurrently, and parse the CSVs. Offline runs read the same CSVs from
//! local paths (plain, `.gz`, or `.zst`) instead. Both end in one flat
//! `Vec<Record>`, concatenated across files.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::events::parser;
use crate::events::types::LogFileMeta;
use crate::pipeline::Record;
use crate::salesforce::{soql_quote, SalesforceClient};
use crate::utils::concurrent::{join_all_settled, Settled};
use crate::utils::format::format_number;
use crate::utils::progress::ProgressBar;
use crate::utils::reader::open_log_file;

/// Parse a `--date` flag value
pub fn parse_log_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}'. Use YYYY-MM-DD format", raw))
}

/// List event log file descriptors, newest first.
///
/// `event_type` restricts to one type; `date` restricts to log files whose
/// `LogDate` falls on that day.
pub async fn list_log_files(
    client: &SalesforceClient,
    event_type: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<Vec<LogFileMeta>> {
    let soql = log_files_soql(event_type, date)?;
    let response = client
        .query::<LogFileMeta>(&soql)
        .await
        .context("Failed to list event log files")?;
    Ok(response.records)
}

/// Keep only the newest log file per event type, preserving first-seen
/// type order.
pub fn latest_only(files: Vec<LogFileMeta>) -> Vec<LogFileMeta> {
    let mut newest: Vec<LogFileMeta> = Vec::new();
    for file in files {
        match newest
            .iter_mut()
            .find(|kept| kept.event_type == file.event_type)
        {
            Some(kept) => {
                // LogDate strings share one format, so text order is date order
                if file.log_date > kept.log_date {
                    *kept = file;
                }
            }
            None => newest.push(file),
        }
    }
    newest
}

/// Download and parse every listed log file concurrently.
///
/// A failed download or parse becomes a collected reason instead of
/// sinking the run; the records of the successful files are concatenated.
/// Concatenation order follows completion order, so callers must sort
/// before presenting.
pub async fn fetch_records(
    client: &SalesforceClient,
    files: &[LogFileMeta],
) -> (Vec<Record>, Vec<anyhow::Error>) {
    if files.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let bar = ProgressBar::new(files.len(), "Downloading log files");
    let branches: Vec<_> = files
        .iter()
        .map(|file| {
            let client = client.clone();
            let bar = bar.clone();
            let id = file.id.clone();
            let event_type = file.event_type.clone();
            async move {
                let body = client
                    .fetch_log_body(&id)
                    .await
                    .with_context(|| format!("Log file {} ({})", id, event_type))?;
                let records = parser::parse_csv(body.as_bytes())
                    .with_context(|| format!("Log file {} ({})", id, event_type))?;
                bar.inc();
                Ok::<_, anyhow::Error>(records)
            }
        })
        .collect();

    let Settled { values, failures } = join_all_settled(branches).await;
    bar.finish_with_message("Download complete");

    let records: Vec<Record> = values.into_iter().flatten().collect();
    (records, failures)
}

/// Read local event log CSVs in the order given.
///
/// Unlike the online path, a bad local file aborts the run: the user named
/// it explicitly.
pub fn read_local_files(paths: &[PathBuf]) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for path in paths {
        let reader = open_log_file(path)?;
        let parsed = parser::parse_csv(reader)
            .with_context(|| format!("Failed to parse event log file: {}", path.display()))?;
        eprintln!(
            "Loaded {} records from {}",
            format_number(parsed.len()),
            path.display()
        );
        records.extend(parsed);
    }
    Ok(records)
}

fn log_files_soql(event_type: Option<&str>, date: Option<NaiveDate>) -> Result<String> {
    let mut clauses = Vec::new();
    if let Some(event_type) = event_type {
        clauses.push(format!("EventType = {}", soql_quote(event_type)));
    }
    if let Some(date) = date {
        let next = date.succ_opt().context("Log date out of range")?;
        clauses.push(format!(
            "LogDate >= {}T00:00:00Z AND LogDate < {}T00:00:00Z",
            date, next
        ));
    }

    let mut soql = String::from(
        "SELECT Id, EventType, LogDate, LogFileLength, Interval FROM EventLogFile",
    );
    if !clauses.is_empty() {
        soql.push_str(" WHERE ");
        soql.push_str(&clauses.join(" AND "));
    }
    soql.push_str(" ORDER BY LogDate DESC");
    Ok(soql)
}
