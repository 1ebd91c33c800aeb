//! Reduction of groups into summary records.
//!
//! Each group becomes exactly one summary: the group key under a
//! report-chosen field name, a `count`, and the arithmetic mean of every
//! column named in the report's field map, rounded to two decimals. A
//! separate enrichment step fills display fields (`name`, `username`) from a
//! directory lookup, defaulting to `"Unknown"` when the lookup missed.
//!
//! ELF cells are strings on the wire, so numeric parsing happens here. A
//! cell that is absent or does not parse contributes 0 to the sum while the
//! divisor stays the full group size; `count` and the mean's denominator
//! therefore always agree.

use crate::pipeline::group::{Group, NestedGroup};
use crate::pipeline::sort::{apply_limit, sort_summaries};
use crate::pipeline::{GroupKey, Summary};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Output field name → source column name pairs averaged per group.
pub type FieldMap = [(&'static str, &'static str)];

/// Display value used when the directory lookup has no entry for a key.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Display fields resolved for one directory id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
    pub username: String,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            username: UNKNOWN_NAME.to_string(),
        }
    }
}

/// Reduce each group to a summary record.
///
/// The emitted fields are exactly: `key_field` (the group key), `count`,
/// one field per `field_map` entry, and whatever `extra` carries. `extra`
/// entries are merged verbatim into every summary. Group size is never zero
/// (the grouping engine materializes no empty groups), so the division is
/// safe.
pub fn aggregate(
    groups: &[Group],
    key_field: &str,
    field_map: &FieldMap,
    extra: Option<&Summary>,
) -> Vec<Summary> {
    groups
        .iter()
        .map(|group| {
            let mut summary = Summary::new();
            summary.insert(key_field.to_string(), Value::String(group.key.clone()));
            summary.insert("count".to_string(), Value::from(group.records.len()));

            for (out_field, src_field) in field_map {
                let sum: f64 = group
                    .records
                    .iter()
                    .map(|r| parse_numeric(r.get(*src_field)).unwrap_or(0.0))
                    .sum();
                let avg = round2(sum / group.records.len() as f64);
                summary.insert((*out_field).to_string(), number(avg));
            }

            if let Some(extra) = extra {
                for (field, value) in extra {
                    summary.insert(field.clone(), value.clone());
                }
            }

            summary
        })
        .collect()
}

/// Build two-level summaries: one row per outer group with its sub-rows
/// attached under `children_field` as a JSON array.
///
/// The outer `count` is the total record count under the outer key. Inner
/// summaries are count-only rows sorted and limited independently of the
/// outer level, which gets its own sort/limit later in the run.
pub fn aggregate_nested(
    nested: &[NestedGroup],
    outer_field: &str,
    inner_field: &str,
    children_field: &str,
    sub_sort: &[String],
    ascending: bool,
    sub_limit: Option<usize>,
) -> Vec<Summary> {
    nested
        .iter()
        .map(|outer| {
            let mut summary = Summary::new();
            summary.insert(outer_field.to_string(), Value::String(outer.key.clone()));
            summary.insert("count".to_string(), Value::from(outer.len()));

            let children = aggregate(&outer.groups, inner_field, &[], None);
            let children = sort_summaries(children, sub_sort, ascending);
            let children = apply_limit(children, sub_limit);
            summary.insert(
                children_field.to_string(),
                Value::Array(children.into_iter().map(Value::Object).collect()),
            );

            summary
        })
        .collect()
}

/// Fill `name` and `username` on each summary from the directory map.
///
/// The map is keyed by the same ids the summaries carry in `key_field`
/// (callers normalize id forms before building it). Misses fall back to
/// [`UNKNOWN_NAME`] for both fields.
pub fn enrich(summaries: &mut [Summary], key_field: &str, directory: &HashMap<GroupKey, UserInfo>) {
    for summary in summaries.iter_mut() {
        let info = summary
            .get(key_field)
            .and_then(Value::as_str)
            .and_then(|key| directory.get(key))
            .cloned()
            .unwrap_or_default();
        summary.insert("name".to_string(), Value::String(info.name));
        summary.insert("username".to_string(), Value::String(info.username));
    }
}

/// Numeric reading of a record cell: JSON numbers as-is, strings parsed.
pub fn parse_numeric(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn number(x: f64) -> Value {
    Number::from_f64(x).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::group::{field_key, group_nested, group_records};
    use crate::pipeline::Record;

    fn cpu_record(user: &str, cpu: &str) -> Record {
        let mut record = Record::new();
        record.insert("USER_ID".to_string(), Value::from(user));
        record.insert("CPU_TIME".to_string(), Value::from(cpu));
        record
    }

    fn group_of(records: Vec<Record>) -> Vec<Group> {
        group_records(records, |r| field_key(r, "USER_ID"))
    }

    #[test]
    fn test_count_matches_group_size() {
        let groups = group_of(vec![
            cpu_record("a", "1"),
            cpu_record("a", "2"),
            cpu_record("b", "3"),
        ]);

        let summaries = aggregate(&groups, "USER_ID", &[], None);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0]["count"], Value::from(2));
        assert_eq!(summaries[1]["count"], Value::from(1));
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        // 5 + 10 + 5 + 2 = 22, 22 / 4 = 5.5 exactly.
        let groups = group_of(vec![
            cpu_record("a", "5"),
            cpu_record("a", "10"),
            cpu_record("a", "5"),
            cpu_record("a", "2"),
        ]);

        let summaries = aggregate(&groups, "USER_ID", &[("cpu", "CPU_TIME")], None);

        assert_eq!(summaries[0]["cpu"], Value::from(5.5));
    }

    #[test]
    fn test_repeating_average_rounds_not_truncates() {
        // 1 + 1 + 0 = 2, 2 / 3 = 0.666... → 0.67
        let groups = group_of(vec![
            cpu_record("a", "1"),
            cpu_record("a", "1"),
            cpu_record("a", "0"),
        ]);

        let summaries = aggregate(&groups, "USER_ID", &[("cpu", "CPU_TIME")], None);

        assert_eq!(summaries[0]["cpu"], Value::from(0.67));
    }

    #[test]
    fn test_unparsable_values_contribute_zero_but_keep_divisor() {
        let mut no_cpu = Record::new();
        no_cpu.insert("USER_ID".to_string(), Value::from("a"));

        let groups = group_of(vec![
            cpu_record("a", "5"),
            cpu_record("a", "not-a-number"),
            no_cpu,
        ]);

        let summaries = aggregate(&groups, "USER_ID", &[("cpu", "CPU_TIME")], None);

        // Sum is 5, divisor stays 3.
        assert_eq!(summaries[0]["count"], Value::from(3));
        assert_eq!(summaries[0]["cpu"], Value::from(1.67));
    }

    #[test]
    fn test_emitted_fields_are_exactly_key_count_and_field_map() {
        let groups = group_of(vec![cpu_record("a", "5")]);

        let summaries = aggregate(&groups, "USER_ID", &[("cpu", "CPU_TIME")], None);

        let fields: Vec<&str> = summaries[0].keys().map(String::as_str).collect();
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&"USER_ID"));
        assert!(fields.contains(&"count"));
        assert!(fields.contains(&"cpu"));
    }

    #[test]
    fn test_extra_fields_merge_verbatim() {
        let groups = group_of(vec![cpu_record("a", "5")]);
        let mut extra = Summary::new();
        extra.insert("source".to_string(), Value::from("api"));

        let summaries = aggregate(&groups, "USER_ID", &[], Some(&extra));

        assert_eq!(summaries[0]["source"], Value::from("api"));
    }

    #[test]
    fn test_enrich_uses_directory_and_defaults_to_unknown() {
        let groups = group_of(vec![cpu_record("005a", "1"), cpu_record("005b", "1")]);
        let mut summaries = aggregate(&groups, "USER_ID", &[], None);

        let mut directory = HashMap::new();
        directory.insert(
            "005a".to_string(),
            UserInfo {
                name: "Ada Lovelace".to_string(),
                username: "ada@example.com".to_string(),
            },
        );

        enrich(&mut summaries, "USER_ID", &directory);

        assert_eq!(summaries[0]["name"], Value::from("Ada Lovelace"));
        assert_eq!(summaries[0]["username"], Value::from("ada@example.com"));
        assert_eq!(summaries[1]["name"], Value::from(UNKNOWN_NAME));
        assert_eq!(summaries[1]["username"], Value::from(UNKNOWN_NAME));
    }

    #[test]
    fn test_nested_aggregation_counts_sorts_and_limits_children() {
        let mut records = Vec::new();
        for uri in ["/a", "/b", "/b", "/c", "/c", "/c"] {
            let mut r = Record::new();
            r.insert("USER_ID".to_string(), Value::from("u1"));
            r.insert("URI".to_string(), Value::from(uri));
            records.push(r);
        }

        let nested = group_nested(
            records,
            |r| field_key(r, "USER_ID"),
            |r| field_key(r, "URI"),
        );
        let summaries = aggregate_nested(
            &nested,
            "USER_ID",
            "endpoint",
            "endpoints",
            &["count".to_string()],
            false,
            Some(2),
        );

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0]["count"], Value::from(6));

        let children = summaries[0]["endpoints"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["endpoint"], Value::from("/c"));
        assert_eq!(children[0]["count"], Value::from(3));
        assert_eq!(children[1]["endpoint"], Value::from("/b"));
    }

    #[test]
    fn test_parse_numeric_reads_numbers_and_numeric_strings() {
        assert_eq!(parse_numeric(Some(&Value::from(3))), Some(3.0));
        assert_eq!(parse_numeric(Some(&Value::from("4.5"))), Some(4.5));
        assert_eq!(parse_numeric(Some(&Value::from(" 12 "))), Some(12.0));
        assert_eq!(parse_numeric(Some(&Value::from("abc"))), None);
        assert_eq!(parse_numeric(Some(&Value::Null)), None);
        assert_eq!(parse_numeric(None), None);
    }
}
