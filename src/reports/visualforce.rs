//! Visualforce page performance.
//!
//! Groups VisualforceRequest event log records by page and reports request
//! counts with average run time, CPU time, view state size, and response
//! size. Oversized view states are the usual smoking gun for slow pages.
//!
//! # Usage
//!
//! ```bash
//! # Heaviest pages by view state
//! sf-events visualforce --latest --sort avg_view_state --limit 20
//!
//! # Offline analysis
//! sf-events visualforce --files vf.csv
//! ```

use anyhow::Result;

use crate::output::{fmt_avg, fmt_count, fmt_text, Align, Column};
use crate::pipeline::group::field_key;
use crate::pipeline::{GroupKey, Record};
use crate::reports::descriptor::{run_report, ReportOptions, ReportSpec};
use crate::reports::{collect_records, ConnectionArgs, ReportArgs};

static SPEC: ReportSpec = ReportSpec {
    name: "visualforce",
    event_type: "VisualforceRequest",
    key_field: "page_name",
    key_fn: page_name_key,
    field_map: &[
        ("avg_run_time", "RUN_TIME"),
        ("avg_cpu_time", "CPU_TIME"),
        ("avg_view_state", "VIEW_STATE_SIZE"),
        ("avg_response_size", "RESPONSE_SIZE"),
    ],
    columns: &[
        Column {
            field: "page_name",
            header: "Page",
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
            field: "avg_view_state",
            header: "Avg View State (b)",
            align: Align::Right,
            formatter: fmt_avg,
        },
        Column {
            field: "avg_response_size",
            header: "Avg Response (b)",
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

fn page_name_key(record: &Record) -> Option<GroupKey> {
    field_key(record, "PAGE_NAME")
}

pub async fn run(connection: &ConnectionArgs, args: &ReportArgs) -> Result<()> {
    let (records, client) = collect_records(connection, args, SPEC.event_type).await?;
    let options = ReportOptions::from_args(&SPEC, args, None, None);
    run_report(&SPEC, records, client.as_ref(), &options).await
}
