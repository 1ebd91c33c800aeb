//! Apex execution hotspots.
//!
//! Groups ApexExecution event log records by entry point and reports how
//! often each one ran and what it cost on average.
//!
//! # Usage
//!
//! ```bash
//! # Slowest entry points, latest log file
//! sf-events apex-execution --latest --sort avg_run_time --limit 25
//!
//! # Offline analysis
//! sf-events apex-execution --files apex.csv.gz
//! ```

use anyhow::Result;

use crate::output::{fmt_avg, fmt_count, fmt_text, Align, Column};
use crate::pipeline::group::field_key;
use crate::pipeline::{GroupKey, Record};
use crate::reports::descriptor::{run_report, ReportOptions, ReportSpec};
use crate::reports::{collect_records, ConnectionArgs, ReportArgs};

static SPEC: ReportSpec = ReportSpec {
    name: "apex-execution",
    event_type: "ApexExecution",
    key_field: "entry_point",
    key_fn: entry_point_key,
    field_map: &[
        ("avg_run_time", "RUN_TIME"),
        ("avg_cpu_time", "CPU_TIME"),
        ("avg_exec_time", "EXEC_TIME"),
        ("avg_soql_queries", "NUMBER_SOQL_QUERIES"),
    ],
    columns: &[
        Column {
            field: "entry_point",
            header: "Entry Point",
            align: Align::Left,
            formatter: fmt_text,
        },
        Column {
            field: "count",
            header: "Executions",
            align: Align::Right,
            formatter: fmt_count,
        },
        Column {
            field: "avg_run_time",
            header: "Avg Run (ms)",
            align: Align::Right,
            formatter: fmt_avg,
        },
        Column {
            field: "avg_cpu_time",
            header: "Avg CPU (ms)",
            align: Align::Right,
            formatter: fmt_avg,
        },
        Column {
            field: "avg_exec_time",
            header: "Avg Exec (ms)",
            align: Align::Right,
            formatter: fmt_avg,
        },
        Column {
            field: "avg_soql_queries",
            header: "Avg SOQL",
            align: Align::Right,
            formatter: fmt_avg,
        },
    ],
    default_sort: &["count"],
    user_keyed: false,
    record_filter: None,
    nested: None,
    format_override: None,
};

fn entry_point_key(record: &Record) -> Option<GroupKey> {
    field_key(record, "ENTRY_POINT")
}

pub async fn run(connection: &ConnectionArgs, args: &ReportArgs) -> Result<()> {
    let (records, client) = collect_records(connection, args, SPEC.event_type).await?;
    let options = ReportOptions::from_args(&SPEC, args, None, None);
    run_report(&SPEC, records, client.as_ref(), &options).await
}
