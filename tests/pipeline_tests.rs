/// End-to-end tests for the aggregation pipeline
/// These exercise the full group -> aggregate -> filter -> sort -> limit
/// sequence over synthetic record sets, outside any one report.
use serde_json::Value;

use sf_event_tools::pipeline::aggregate::{aggregate, aggregate_nested};
use sf_event_tools::pipeline::filter::{apply_filter, Predicate};
use sf_event_tools::pipeline::group::{field_key, group_nested, group_records};
use sf_event_tools::pipeline::sort::{apply_limit, sort_summaries};
use sf_event_tools::pipeline::Record;
use sf_event_tools::utils::concurrent::join_all_settled;

fn record(fields: &[(&str, &str)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

/// 20 synthetic Login records: five users with a known spread of failures
/// plus successful logins mixed in between.
fn login_records() -> Vec<Record> {
    let rows = [
        ("amara", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("bo", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("chen", "LOGIN_NO_ERROR"),
        ("amara", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("dara", "LOGIN_ERROR_PASSWORD_LOCKOUT"),
        ("eli", "LOGIN_NO_ERROR"),
        ("amara", "LOGIN_ERROR_PASSWORD_LOCKOUT"),
        ("bo", "LOGIN_ERROR_RATE_EXCEEDED"),
        ("chen", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("amara", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("bo", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("dara", "LOGIN_NO_ERROR"),
        ("chen", "LOGIN_ERROR_RATE_EXCEEDED"),
        ("amara", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("bo", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("eli", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("chen", "LOGIN_ERROR_INVALID_PASSWORD"),
        ("dara", "LOGIN_ERROR_PASSWORD_LOCKOUT"),
        ("eli", "LOGIN_NO_ERROR"),
        ("amara", "LOGIN_ERROR_RATE_EXCEEDED"),
    ];
    rows.iter()
        .map(|(user, status)| record(&[("USER_NAME", user), ("LOGIN_STATUS", status)]))
        .collect()
}

#[test]
fn test_grouping_partitions_without_losing_records() {
    let records = login_records();
    let total = records.len();

    let groups = group_records(records, |r| field_key(r, "USER_NAME"));

    assert!(groups.len() <= total);
    assert_eq!(groups.iter().map(|g| g.records.len()).sum::<usize>(), total);
}

#[test]
fn test_aggregate_count_equals_group_size() {
    let groups = group_records(login_records(), |r| field_key(r, "USER_NAME"));
    let summaries = aggregate(&groups, "user_name", &[], None);

    assert_eq!(summaries.len(), groups.len());
    for (group, summary) in groups.iter().zip(&summaries) {
        assert_eq!(summary["count"], Value::from(group.records.len()));
    }
}

#[test]
fn test_two_decimal_average_contract() {
    let records = vec![
        record(&[("USER_ID", "u"), ("CPU", "5")]),
        record(&[("USER_ID", "u"), ("CPU", "10")]),
        record(&[("USER_ID", "u"), ("CPU", "5")]),
        record(&[("USER_ID", "u"), ("CPU", "2")]),
    ];

    let groups = group_records(records, |r| field_key(r, "USER_ID"));
    let summaries = aggregate(&groups, "user_id", &[("cpu", "CPU")], None);

    assert_eq!(summaries[0]["cpu"], Value::from(5.5));
}

#[test]
fn test_sort_then_limit_both_directions() {
    let input: Vec<_> = [2, 1, 3]
        .iter()
        .map(|n| {
            let mut s = sf_event_tools::pipeline::Summary::new();
            s.insert("f".to_string(), Value::from(*n));
            s
        })
        .collect();

    let descending = apply_limit(
        sort_summaries(input.clone(), &["f".to_string()], false),
        Some(2),
    );
    assert_eq!(descending[0]["f"], Value::from(3));
    assert_eq!(descending[1]["f"], Value::from(2));

    let ascending = apply_limit(sort_summaries(input, &["f".to_string()], true), Some(2));
    assert_eq!(ascending[0]["f"], Value::from(1));
    assert_eq!(ascending[1]["f"], Value::from(2));
}

#[test]
fn test_set_membership_filter_preserves_order() {
    let input: Vec<_> = ["foo", "bar", "baz"]
        .iter()
        .map(|v| {
            let mut s = sf_event_tools::pipeline::Summary::new();
            s.insert("field".to_string(), Value::from(*v));
            s
        })
        .collect();

    let predicate =
        Predicate::new().field_in("field", vec![Value::from("foo"), Value::from("baz")]);
    let kept = apply_filter(input, &predicate);

    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0]["field"], Value::from("foo"));
    assert_eq!(kept[1]["field"], Value::from("baz"));
}

#[tokio::test]
async fn test_fan_out_join_survives_one_failed_branch() {
    let settled = join_all_settled((1..=3).map(|i| async move {
        if i == 2 {
            anyhow::bail!("branch {} failed", i);
        }
        Ok(i * 10)
    }))
    .await;

    let mut values = settled.values;
    values.sort_unstable();
    assert_eq!(values, vec![10, 30]);
    assert_eq!(settled.failures.len(), 1);
    assert!(settled.failures[0].to_string().contains("branch 2"));
}

#[test]
fn test_login_failure_scenario_top_five() {
    // Failure counts in the fixture: amara 6, bo 4, chen 3, dara 2, eli 1,
    // plus 4 successful rows that must not count.
    let mut records = login_records();
    records.retain(|r| {
        r.get("LOGIN_STATUS").and_then(Value::as_str) != Some("LOGIN_NO_ERROR")
    });
    assert_eq!(records.len(), 16);

    let nested = group_nested(
        records,
        |r| field_key(r, "USER_NAME"),
        |r| field_key(r, "LOGIN_STATUS"),
    );
    let summaries = aggregate_nested(
        &nested,
        "user_name",
        "login_status",
        "statuses",
        &["count".to_string()],
        false,
        None,
    );
    let summaries = sort_summaries(summaries, &["count".to_string()], false);
    let summaries = apply_limit(summaries, Some(5));

    let users: Vec<&str> = summaries
        .iter()
        .map(|s| s["user_name"].as_str().unwrap())
        .collect();
    assert_eq!(users, vec!["amara", "bo", "chen", "dara", "eli"]);

    let counts: Vec<u64> = summaries
        .iter()
        .map(|s| s["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![6, 4, 3, 2, 1]);

    // amara's nested breakdown, sorted descending by count
    let statuses = summaries[0]["statuses"].as_array().unwrap();
    assert_eq!(
        statuses[0]["login_status"],
        Value::from("LOGIN_ERROR_INVALID_PASSWORD")
    );
    assert_eq!(statuses[0]["count"], Value::from(4));
}
