//! Login failures by user.
//!
//! Reads Login event log records, drops the successful logins, and groups
//! the remainder by username with the failing status codes nested under
//! each user. The classic question this answers: who is locked out, being
//! brute-forced, or running a job with an expired password.
//!
//! # Usage
//!
//! ```bash
//! # Top 5 users by failure count, yesterday's log
//! sf-events login-failures --date 2026-08-22 --limit 5
//!
//! # One user's failure breakdown
//! sf-events login-failures --user jdoe@example.com --files login.csv
//! ```
//!
//! # Output
//!
//! One row per username with the total failure count; nested rows break
//! the count down by LOGIN_STATUS code (e.g. LOGIN_ERROR_INVALID_PASSWORD,
//! LOGIN_ERROR_PASSWORD_LOCKOUT).

use anyhow::Result;
use serde_json::Value;

use crate::output::{fmt_count, fmt_text, Align, Column, SubTable};
use crate::pipeline::group::field_key;
use crate::pipeline::{GroupKey, Record};
use crate::reports::descriptor::{run_report, NestedSpec, ReportOptions, ReportSpec};
use crate::reports::{collect_records, ConnectionArgs, ReportArgs, SubArgs};

/// LOGIN_STATUS value of a successful login.
pub const LOGIN_SUCCESS: &str = "LOGIN_NO_ERROR";

static SPEC: ReportSpec = ReportSpec {
    name: "login-failures",
    event_type: "Login",
    key_field: "user_name",
    key_fn: user_name_key,
    field_map: &[],
    columns: &[
        Column {
            field: "user_name",
            header: "Username",
            align: Align::Left,
            formatter: fmt_text,
        },
        Column {
            field: "count",
            header: "Failures",
            align: Align::Right,
            formatter: fmt_count,
        },
    ],
    default_sort: &["count"],
    user_keyed: false,
    record_filter: Some(failed_login),
    nested: Some(NestedSpec {
        inner_field: "login_status",
        inner_key_fn: status_key,
        children_field: "statuses",
        sub_table: SubTable {
            field: "statuses",
            columns: &[
                Column {
                    field: "login_status",
                    header: "Status",
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
    format_override: None,
};

fn user_name_key(record: &Record) -> Option<GroupKey> {
    field_key(record, "USER_NAME")
}

fn status_key(record: &Record) -> Option<GroupKey> {
    field_key(record, "LOGIN_STATUS")
}

// Keep everything that is not a clean success; a record without a status
// is not a successful login either
fn failed_login(record: &Record) -> bool {
    record.get("LOGIN_STATUS").and_then(Value::as_str) != Some(LOGIN_SUCCESS)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn login(status: Option<&str>) -> Record {
        let mut record = Record::new();
        record.insert(
            "USER_NAME".to_string(),
            Value::String("jdoe@example.com".to_string()),
        );
        if let Some(status) = status {
            record.insert("LOGIN_STATUS".to_string(), Value::String(status.to_string()));
        }
        record
    }

    #[test]
    fn test_successful_logins_are_dropped() {
        assert!(!failed_login(&login(Some(LOGIN_SUCCESS))));
        assert!(failed_login(&login(Some("LOGIN_ERROR_INVALID_PASSWORD"))));
        assert!(failed_login(&login(None)));
    }
}
