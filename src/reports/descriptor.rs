//! Report descriptors and the shared report runner.
//!
//! Each report subcommand contributes one static [`ReportSpec`]: which
//! event type it reads, how a record keys into its group, which columns
//! get averaged, and how the result renders. [`run_report`] then drives
//! every report through the same pipeline: pre-filter, group, aggregate,
//! filter, enrich, sort, limit, render. The pipeline itself stays generic;
//! all per-report behavior lives in the descriptor.

use anyhow::Result;
use serde_json::Value;

use crate::output::{self, Column, FormatOverride, SubTable};
use crate::pipeline::aggregate::{aggregate, aggregate_nested, enrich, FieldMap};
use crate::pipeline::filter::{apply_filter, Predicate};
use crate::pipeline::group::{group_nested, group_records};
use crate::pipeline::sort::{apply_limit, sort_summaries};
use crate::pipeline::{GroupKey, Record};
use crate::salesforce::{short_id, SalesforceClient};
use crate::utils::format::format_number;

use super::{ReportArgs, SubArgs};

/// Static description of one report type.
pub struct ReportSpec {
    /// Subcommand name, used in status output.
    pub name: &'static str,
    /// The EventLogFile EventType this report reads.
    pub event_type: &'static str,
    /// Summary field the group key lands under.
    pub key_field: &'static str,
    /// Extracts the group key from a record.
    pub key_fn: fn(&Record) -> Option<GroupKey>,
    /// Output field to source column pairs to average.
    pub field_map: &'static FieldMap,
    /// Table columns, in render order.
    pub columns: &'static [Column],
    /// Sort fields used when `--sort` is not given.
    pub default_sort: &'static [&'static str],
    /// The key field holds user IDs: enrich rows with names and match
    /// `--user` on the 15-character prefix.
    pub user_keyed: bool,
    /// Record-level pre-filter applied before grouping.
    pub record_filter: Option<fn(&Record) -> bool>,
    /// Second grouping level for two-level reports.
    pub nested: Option<NestedSpec>,
    /// Per-cell formatting override.
    pub format_override: Option<fn(&str, &Value) -> Option<String>>,
}

/// Second grouping level of a two-level report.
pub struct NestedSpec {
    /// Summary field the inner key lands under.
    pub inner_field: &'static str,
    /// Extracts the inner key from a record.
    pub inner_key_fn: fn(&Record) -> Option<GroupKey>,
    /// Summary field holding the child row array.
    pub children_field: &'static str,
    /// How child rows render.
    pub sub_table: SubTable,
    /// Child sort fields used when `--subsort` is not given.
    pub default_sub_sort: &'static [&'static str],
}

/// Per-run pipeline configuration, built once from the CLI flags and
/// passed into each stage call.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub sort: Vec<String>,
    pub ascending: bool,
    pub limit: Option<usize>,
    pub sub_sort: Vec<String>,
    pub sub_limit: Option<usize>,
    pub format: String,
    pub user: Option<String>,
}

impl ReportOptions {
    /// Resolve the shared flags against the spec's defaults.
    pub fn from_args(
        spec: &ReportSpec,
        args: &ReportArgs,
        user: Option<&str>,
        sub: Option<&SubArgs>,
    ) -> Self {
        let sort = match args.sort.as_deref() {
            Some(flag) => split_fields(flag),
            None => to_owned_fields(spec.default_sort),
        };
        let sub_sort = match (sub.and_then(|s| s.subsort.as_deref()), spec.nested.as_ref()) {
            (Some(flag), _) => split_fields(flag),
            (None, Some(nested)) => to_owned_fields(nested.default_sub_sort),
            (None, None) => Vec::new(),
        };

        Self {
            sort,
            ascending: args.asc,
            limit: args.limit,
            sub_sort,
            sub_limit: sub.and_then(|s| s.sublimit),
            format: args.format.clone(),
            user: user.map(str::to_string),
        }
    }
}

/// Run one report over already-collected records.
///
/// `client` powers user name enrichment; local-file runs pass `None` and
/// render "Unknown" names instead of failing.
pub async fn run_report(
    spec: &ReportSpec,
    mut records: Vec<Record>,
    client: Option<&SalesforceClient>,
    options: &ReportOptions,
) -> Result<()> {
    if let Some(keep) = spec.record_filter {
        records.retain(|record| keep(record));
    }
    let record_count = records.len();

    let mut summaries = match &spec.nested {
        Some(nested) => {
            let groups = group_nested(records, spec.key_fn, nested.inner_key_fn);
            aggregate_nested(
                &groups,
                spec.key_field,
                nested.inner_field,
                nested.children_field,
                &options.sub_sort,
                options.ascending,
                options.sub_limit,
            )
        }
        None => {
            let groups = group_records(records, spec.key_fn);
            aggregate(&groups, spec.key_field, spec.field_map, None)
        }
    };

    let user = options.user.as_deref().map(|user| {
        if spec.user_keyed {
            short_id(user).to_string()
        } else {
            user.to_string()
        }
    });
    let predicate = Predicate::new().field_opt(spec.key_field, user);
    summaries = apply_filter(summaries, &predicate);

    if spec.user_keyed {
        let ids: Vec<GroupKey> = summaries
            .iter()
            .filter_map(|summary| summary.get(spec.key_field).and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        let directory = match client {
            Some(client) => client.resolve_user_names(&ids).await?,
            None => Default::default(),
        };
        enrich(&mut summaries, spec.key_field, &directory);
    }

    summaries = sort_summaries(summaries, &options.sort, options.ascending);
    summaries = apply_limit(summaries, options.limit);

    eprintln!(
        "Aggregated {} records into {} {} row(s)\n",
        format_number(record_count),
        format_number(summaries.len()),
        spec.name
    );

    let sub_table = spec.nested.as_ref().map(|nested| &nested.sub_table);
    let hook: Option<FormatOverride> = match &spec.format_override {
        Some(f) => Some(f),
        None => None,
    };
    output::render(&summaries, spec.columns, sub_table, hook, &options.format)
}

fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|field| field.trim().to_string())
        .filter(|field| !field.is_empty())
        .collect()
}

fn to_owned_fields(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|field| field.to_string()).collect()
}
