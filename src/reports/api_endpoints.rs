//! API endpoints by user.
//!
//! Two-level view of API traffic: one row per user, with the endpoints
//! that user called nested underneath. The outer and nested levels sort
//! and limit independently (`--sort`/`--limit` vs `--subsort`/`--sublimit`).
//!
//! # Usage
//!
//! ```bash
//! # Top 10 users, their top 5 endpoints each
//! sf-events api-endpoints --latest --limit 10 --sublimit 5
//!
//! # One user's full endpoint breakdown
//! sf-events api-endpoints --user 005xx000001Sv6A --files api.csv
//! ```

use anyhow::Result;
use serde_json::Value;

use crate::output::{fmt_count, fmt_text, Align, Column, SubTable};
use crate::pipeline::group::field_key;
use crate::pipeline::{GroupKey, Record};
use crate::reports::descriptor::{run_report, NestedSpec, ReportOptions, ReportSpec};
use crate::reports::{collect_records, ConnectionArgs, ReportArgs, SubArgs};

const URI_DISPLAY_MAX: usize = 60;

static SPEC: ReportSpec = ReportSpec {
    name: "api-endpoints",
    event_type: "API",
    key_field: "user_id",
    key_fn: user_id_key,
    field_map: &[],
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
            field: "count",
            header: "Requests",
            align: Align::Right,
            formatter: fmt_count,
        },
    ],
    default_sort: &["count"],
    user_keyed: true,
    record_filter: None,
    nested: Some(NestedSpec {
        inner_field: "uri",
        inner_key_fn: uri_key,
        children_field: "endpoints",
        sub_table: SubTable {
            field: "endpoints",
            columns: &[
                Column {
                    field: "uri",
                    header: "URI",
                    align: Align::Left,
                    formatter: fmt_text,
                },
                Column {
                    field: "count",
                    header: "Count",
                    align: Align::Right,
                    formatter: fmt_count,
                },
            ],
            indent: 4,
        },
        default_sub_sort: &["count"],
    }),
    format_override: Some(truncate_uri),
};

fn user_id_key(record: &Record) -> Option<GroupKey> {
    field_key(record, "USER_ID")
}

fn uri_key(record: &Record) -> Option<GroupKey> {
    field_key(record, "URI")
}

// Long endpoint paths would crowd out the count column. Lengths and the
// cut are in chars, matching the renderer's char-based column widths.
fn truncate_uri(field: &str, value: &Value) -> Option<String> {
    if field != "uri" {
        return None;
    }
    let uri = value.as_str()?;
    if uri.chars().count() <= URI_DISPLAY_MAX {
        return None;
    }
    let kept: String = uri.chars().take(URI_DISPLAY_MAX - 3).collect();
    Some(format!("{}...", kept))
}

pub async fn run(
    connection: &ConnectionArgs,
    args: &ReportArgs,
    sub: &SubArgs,
    user: Option<&str>,
) -> Result<()> {
    let (records, client) = collect_records(connection, args, SPEC.event_type).await?;
    let options = ReportOptions::from_args(&SPEC, args, user, Some(sub));
    run_report(&SPEC, records, client.as_ref(), &options).await
}
