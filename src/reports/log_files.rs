//! List available event log files.
//!
//! Shows which EventLogFile rows the org currently holds, so a user can
//! see what the report subcommands would download before running one.
//!
//! # Usage
//!
//! ```bash
//! # Everything the org retains
//! sf-events log-files
//!
//! # Only API logs for one day
//! sf-events log-files --event-type API --date 2026-08-20
//!
//! # Newest file per event type
//! sf-events log-files --latest --format json
//! ```

use anyhow::Result;
use serde_json::Value;

use crate::events::source;
use crate::events::types::LogFileMeta;
use crate::output::{self, fmt_count, fmt_text, Align, Column};
use crate::pipeline::Summary;
use crate::reports::ConnectionArgs;
use crate::salesforce::{should_skip_verify, SalesforceClient};

const COLUMNS: &[Column] = &[
    Column {
        field: "id",
        header: "Id",
        align: Align::Left,
        formatter: fmt_text,
    },
    Column {
        field: "event_type",
        header: "Event Type",
        align: Align::Left,
        formatter: fmt_text,
    },
    Column {
        field: "log_date",
        header: "Log Date",
        align: Align::Left,
        formatter: fmt_text,
    },
    Column {
        field: "interval",
        header: "Interval",
        align: Align::Left,
        formatter: fmt_text,
    },
    Column {
        field: "size",
        header: "Size (b)",
        align: Align::Right,
        formatter: fmt_count,
    },
];

pub async fn run(
    connection: &ConnectionArgs,
    event_type: Option<&str>,
    date: Option<&str>,
    latest: bool,
    format: &str,
) -> Result<()> {
    let client = SalesforceClient::from_options(
        connection.instance_url.as_deref(),
        connection.access_token.as_deref(),
        connection.api_version.as_deref(),
        should_skip_verify(connection.insecure),
    )?;

    let date = date.map(source::parse_log_date).transpose()?;
    let mut files = source::list_log_files(&client, event_type, date).await?;
    if latest {
        files = source::latest_only(files);
    }

    let rows: Vec<Summary> = files.iter().map(file_row).collect();
    output::render(&rows, COLUMNS, None, None, format)
}

fn file_row(file: &LogFileMeta) -> Summary {
    let mut row = Summary::new();
    row.insert("id".to_string(), Value::String(file.id.clone()));
    row.insert(
        "event_type".to_string(),
        Value::String(file.event_type.clone()),
    );
    row.insert("log_date".to_string(), Value::String(file.log_date.clone()));
    row.insert(
        "interval".to_string(),
        match &file.interval {
            Some(interval) => Value::String(interval.clone()),
            None => Value::Null,
        },
    );
    row.insert("size".to_string(), Value::from(file.log_file_length as u64));
    row
}
