//! API usage by user.
//!
//! Groups API event log records by user and reports request counts with
//! average CPU, run, and database times. User IDs are resolved to display
//! names through one batched User query.
//!
//! # Usage
//!
//! ```bash
//! # Latest API log file, top 20 users by request count
//! sf-events api-usage --latest --limit 20
//!
//! # One day, sorted by average run time
//! sf-events api-usage --date 2026-08-20 --sort avg_run_time
//!
//! # Offline, from downloaded log files (plain or compressed)
//! sf-events api-usage --files api_day1.csv api_day2.csv.gz
//!
//! # Single user, as JSON
//! sf-events api-usage --user 005xx000001Sv6A --format json
//! ```
//!
//! # Output
//!
//! One row per user:
//! - `count` - API requests in the covered window
//! - `avg_cpu_time` - mean CPU_TIME in milliseconds
//! - `avg_run_time` - mean RUN_TIME in milliseconds
//! - `avg_db_time` - mean DB_TOTAL_TIME, logged in nanoseconds and
//!   rendered in milliseconds
//!
//! Useful for:
//! - Finding integration users hammering the API
//! - Spotting users whose requests run unusually slow

use anyhow::Result;

use crate::output::{fmt_avg, fmt_count, fmt_nanos_ms, fmt_text, Align, Column};
use crate::pipeline::group::field_key;
use crate::pipeline::{GroupKey, Record};
use crate::reports::descriptor::{run_report, ReportOptions, ReportSpec};
use crate::reports::{collect_records, ConnectionArgs, ReportArgs};

static SPEC: ReportSpec = ReportSpec {
    name: "api-usage",
    event_type: "API",
    key_field: "user_id",
    key_fn: user_id_key,
    field_map: &[
        ("avg_cpu_time", "CPU_TIME"),
        ("avg_run_time", "RUN_TIME"),
        ("avg_db_time", "DB_TOTAL_TIME"),
    ],
    columns: &[
        Column {
            field: "user_id",
            header: "User ID",
            align: Align::Left,
            formatter: fmt_text,
        },
        Column {
            field: "name",
            header: "Name",
            align: Align::Left,
            formatter: fmt_text,
        },
        Column {
            field: "username",
            header: "Username",
            align: Align::Left,
            formatter: fmt_text,
        },
        Column {
            field: "count",
            header: "Requests",
            align: Align::Right,
            formatter: fmt_count,
        },
        Column {
            field: "avg_cpu_time",
            header: "Avg CPU (ms)",
            align: Align::Right,
            formatter: fmt_avg,
        },
        Column {
            field: "avg_run_time",
            header: "Avg Run (ms)",
            align: Align::Right,
            formatter: fmt_avg,
        },
        Column {
            field: "avg_db_time",
            header: "Avg DB (ms)",
            align: Align::Right,
            formatter: fmt_nanos_ms,
        },
    ],
    default_sort: &["count"],
    user_keyed: true,
    record_filter: None,
    nested: None,
    format_override: None,
};

fn user_id_key(record: &Record) -> Option<GroupKey> {
    field_key(record, "USER_ID")
}

pub async fn run(connection: &ConnectionArgs, args: &ReportArgs, user: Option<&str>) -> Result<()> {
    let (records, client) = collect_records(connection, args, SPEC.event_type).await?;
    let options = ReportOptions::from_args(&SPEC, args, user, None);
    run_report(&SPEC, records, client.as_ref(), &options).await
}
