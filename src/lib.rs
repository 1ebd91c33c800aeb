//! # Salesforce Event Tools
//!
//! Command-line reporting for Salesforce Event Monitoring: downloads
//! event log files over the REST API (or reads them from disk), runs them
//! through a generic aggregation pipeline, and prints tables or JSON.
//!
//! ## Overview
//!
//! Event Monitoring delivers org activity as daily (or hourly) CSV log
//! files, one per event type. This crate turns those files into answers:
//! which users hammer the API, which logins keep failing, which Apex entry
//! points and Visualforce pages burn the most time.
//!
//! Every report runs the same pipeline: group records by a key, aggregate
//! counts and averages per group, filter, sort, limit, render. Report
//! types differ only in a small static descriptor (event type, key
//! extractor, averaged columns, table layout), so adding a report means
//! writing a descriptor, not a pipeline.
//!
//! ## Features
//!
//! - **Five report families** - API usage, API endpoints per user, login
//!   failures, Apex execution, Visualforce performance
//! - **Two-level reports** - nested breakdowns with independent
//!   sort/limit per level (`--subsort`, `--sublimit`)
//! - **Concurrent downloads** - log file bodies fetched in parallel; one
//!   failed file warns instead of killing the run
//! - **User enrichment** - user IDs resolved to names in one batched query
//! - **Offline mode** - `--files` reads local CSVs, including `.gz` and
//!   `.zst`, with no credentials needed
//! - **Shell completion** for bash, zsh, fish, powershell, and elvish
//!
//! ## Architecture
//!
//! - [`pipeline`] - grouping, aggregation, filtering, sorting
//! - [`reports`] - report descriptors and subcommand implementations
//! - [`events`] - record acquisition: API listing/download and local files
//! - [`salesforce`] - REST client (SOQL, log file bodies, user lookup)
//! - [`output`] - table and JSON rendering
//! - [`utils`] - shared utilities (fan-out join, progress, readers)
//!
//! ## Example Usage
//!
//! ```bash
//! # Top API users from the latest log file
//! sf-events api-usage --latest --limit 20
//!
//! # Who failed to log in yesterday, and how
//! sf-events login-failures --date 2026-08-22 --limit 5
//!
//! # Offline: compressed files work directly
//! sf-events apex-execution --files apex_day1.csv.gz apex_day2.csv.zst
//!
//! # See what the org retains before downloading anything
//! sf-events log-files --latest
//! ```
//!
//! Credentials come from flags or the environment (`SF_INSTANCE_URL`,
//! `SF_ACCESS_TOKEN` or `SF_ACCESS_TOKEN_FILE`, optional
//! `SF_API_VERSION`).
//!
//! ## Installation
//!
//! From source:
//! ```bash
//! git clone https://github.com/trenner1/sf-event-tools
//! cd sf-event-tools
//! cargo install --path .
//! ```

pub mod events;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod salesforce;
pub mod utils;
