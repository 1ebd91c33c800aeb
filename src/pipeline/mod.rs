//! The generic report-aggregation pipeline.
//!
//! Every report subcommand runs the same sequence over a flat set of log
//! records: group → aggregate → filter → sort → limit → render. The stages
//! are plain functions over owned data so each report stays a few lines of
//! glue around its [`ReportSpec`](crate::reports::descriptor::ReportSpec):
//!
//! - [`group`] - one- and two-level partitioning by extracted keys
//! - [`aggregate`] - per-group counts, field averages, and name enrichment
//! - [`filter`] - field/value predicates over summary records
//! - [`sort`] - stable multi-field ordering and result limiting
//!
//! Records and summaries are dynamic JSON maps: Event Log File columns vary
//! per event type, and `--format json` serializes summaries as-is.

pub mod aggregate;
pub mod filter;
pub mod group;
pub mod sort;

/// One raw log row: field name → scalar value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One aggregated output row, produced from exactly one group.
pub type Summary = serde_json::Map<String, serde_json::Value>;

/// Key derived from a record; two records with equal keys share a group.
pub type GroupKey = String;
