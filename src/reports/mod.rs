//! Report subcommand implementations.
//!
//! One module per report family, plus the descriptor model they all share.
//! Every report accepts the same source flags: pull log files from the
//! Event Monitoring API, or read local CSVs with `--files`.

pub mod api_endpoints;
pub mod api_usage;
pub mod apex_execution;
pub mod descriptor;
pub mod log_files;
pub mod login_failures;
pub mod visualforce;

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::events::source;
use crate::pipeline::Record;
use crate::salesforce::{should_skip_verify, SalesforceClient};

/// Connection flags shared by every subcommand that reaches the API.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Salesforce instance URL (default: $SF_INSTANCE_URL)
    #[arg(long)]
    pub instance_url: Option<String>,

    /// API access token (default: $SF_ACCESS_TOKEN or $SF_ACCESS_TOKEN_FILE)
    #[arg(long)]
    pub access_token: Option<String>,

    /// API version, e.g. 60.0 (default: $SF_API_VERSION)
    #[arg(long)]
    pub api_version: Option<String>,

    /// Skip TLS certificate verification (insecure)
    #[arg(long)]
    pub insecure: bool,
}

/// Source and shaping flags shared by the report subcommands.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Local event log CSV file(s) instead of the API (plain, .gz, or .zst)
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Only the newest log file per event type
    #[arg(long)]
    pub latest: bool,

    /// Only log files for this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Sort field(s), comma-separated
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,

    /// Keep only the first N rows after sorting
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output format: table or json
    #[arg(long, default_value = "table")]
    pub format: String,
}

/// Nested-level flags for two-level reports.
#[derive(Debug, Args)]
pub struct SubArgs {
    /// Sort field(s) for nested rows, comma-separated
    #[arg(long)]
    pub subsort: Option<String>,

    /// Keep only the first N nested rows per group
    #[arg(long)]
    pub sublimit: Option<usize>,
}

/// Gather the records for one report run.
///
/// Local files win when given and need no credentials. Otherwise the API
/// is queried; the client comes back too so the report can resolve user
/// names. Individual download failures are reported as warnings, not
/// errors.
pub(crate) async fn collect_records(
    connection: &ConnectionArgs,
    args: &ReportArgs,
    event_type: &str,
) -> Result<(Vec<Record>, Option<SalesforceClient>)> {
    let date = args
        .date
        .as_deref()
        .map(source::parse_log_date)
        .transpose()?;

    if !args.files.is_empty() {
        let records = source::read_local_files(&args.files)?;
        return Ok((records, None));
    }

    let client = SalesforceClient::from_options(
        connection.instance_url.as_deref(),
        connection.access_token.as_deref(),
        connection.api_version.as_deref(),
        should_skip_verify(connection.insecure),
    )?;

    let mut files = source::list_log_files(&client, Some(event_type), date).await?;
    if args.latest {
        files = source::latest_only(files);
    }
    if files.is_empty() {
        eprintln!("No {} event log files found", event_type);
        return Ok((Vec::new(), Some(client)));
    }
    eprintln!("Found {} {} event log file(s)", files.len(), event_type);

    let (records, failures) = source::fetch_records(&client, &files).await;
    for failure in &failures {
        eprintln!("Warning: {:#}", failure);
    }

    Ok((records, Some(client)))
}
