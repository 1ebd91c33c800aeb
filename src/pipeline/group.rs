//! One- and two-level grouping of log records.
//!
//! Partitions a flat record set into groups keyed by a caller-supplied
//! extraction function, preserving the order keys are first seen. That order
//! is what later stable sorts fall back to on ties, so it is part of the
//! contract here rather than an accident of the container.

use crate::pipeline::{GroupKey, Record};
use serde_json::Value;
use std::collections::HashMap;

/// Bucket for records whose key extractor finds no value.
///
/// A missing grouping field is data, not an error: rows without a `USER_ID`
/// still show up in a per-user report, collected under this key.
pub const UNKNOWN_KEY: &str = "unknown";

/// Records sharing one extracted key, in input order.
#[derive(Debug, Clone)]
pub struct Group {
    pub key: GroupKey,
    pub records: Vec<Record>,
}

/// An outer group whose records have been re-grouped by a second key.
#[derive(Debug, Clone)]
pub struct NestedGroup {
    pub key: GroupKey,
    pub groups: Vec<Group>,
}

impl NestedGroup {
    /// Total records across all inner groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Partition records by key, preserving first-seen key order.
///
/// Records whose key extracts to `None` are still grouped, under
/// [`UNKNOWN_KEY`]. Deterministic for identical input order.
pub fn group_records<F>(records: Vec<Record>, key_fn: F) -> Vec<Group>
where
    F: Fn(&Record) -> Option<GroupKey>,
{
    let mut index: HashMap<GroupKey, usize> = HashMap::with_capacity(64);
    let mut groups: Vec<Group> = Vec::new();

    for record in records {
        let key = key_fn(&record).unwrap_or_else(|| UNKNOWN_KEY.to_string());
        match index.get(&key) {
            Some(&slot) => groups[slot].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    records: vec![record],
                });
            }
        }
    }

    groups
}

/// Two-level grouping: by the outer key, then each bucket by the inner key.
///
/// Both levels keep first-seen order.
pub fn group_nested<F, G>(records: Vec<Record>, outer_fn: F, inner_fn: G) -> Vec<NestedGroup>
where
    F: Fn(&Record) -> Option<GroupKey>,
    G: Fn(&Record) -> Option<GroupKey>,
{
    group_records(records, outer_fn)
        .into_iter()
        .map(|outer| NestedGroup {
            key: outer.key,
            groups: group_records(outer.records, &inner_fn),
        })
        .collect()
}

/// Key extractor for a named record field.
///
/// Strings become the key as-is, numbers via their decimal form. Null,
/// absent, and empty-string values all count as "no key" (ELF CSVs encode
/// missing ids as empty cells).
pub fn field_key(record: &Record, field: &str) -> Option<GroupKey> {
    match record.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_group() {
        let records = vec![
            record(&[("USER_ID", "a")]),
            record(&[("USER_ID", "b")]),
            record(&[("USER_ID", "a")]),
            record(&[("USER_ID", "c")]),
        ];
        let total = records.len();

        let groups = group_records(records, |r| field_key(r, "USER_ID"));

        assert!(groups.len() <= total);
        assert_eq!(groups.iter().map(|g| g.records.len()).sum::<usize>(), total);
        for group in &groups {
            for rec in &group.records {
                assert_eq!(field_key(rec, "USER_ID").unwrap(), group.key);
            }
        }
    }

    #[test]
    fn test_first_seen_key_order_is_preserved() {
        let records = vec![
            record(&[("URI", "/b")]),
            record(&[("URI", "/a")]),
            record(&[("URI", "/b")]),
            record(&[("URI", "/c")]),
            record(&[("URI", "/a")]),
        ];

        let groups = group_records(records, |r| field_key(r, "URI"));

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["/b", "/a", "/c"]);
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[1].records.len(), 2);
        assert_eq!(groups[2].records.len(), 1);
    }

    #[test]
    fn test_missing_and_empty_keys_share_the_unknown_bucket() {
        let records = vec![
            record(&[("USER_ID", "a")]),
            record(&[("OTHER", "x")]),
            record(&[("USER_ID", "")]),
        ];

        let groups = group_records(records, |r| field_key(r, "USER_ID"));

        assert_eq!(groups.len(), 2);
        let unknown = groups.iter().find(|g| g.key == UNKNOWN_KEY).unwrap();
        assert_eq!(unknown.records.len(), 2);
    }

    #[test]
    fn test_numeric_keys_group_by_decimal_form() {
        let mut rec = Record::new();
        rec.insert("STATUS_CODE".to_string(), Value::from(404));
        let groups = group_records(vec![rec], |r| field_key(r, "STATUS_CODE"));
        assert_eq!(groups[0].key, "404");
    }

    #[test]
    fn test_nested_grouping_keeps_order_at_both_levels() {
        let records = vec![
            record(&[("USER_NAME", "kai"), ("LOGIN_STATUS", "LOGIN_ERROR_INVALID_PASSWORD")]),
            record(&[("USER_NAME", "mia"), ("LOGIN_STATUS", "LOGIN_ERROR_RATE_EXCEEDED")]),
            record(&[("USER_NAME", "kai"), ("LOGIN_STATUS", "LOGIN_ERROR_RATE_EXCEEDED")]),
            record(&[("USER_NAME", "kai"), ("LOGIN_STATUS", "LOGIN_ERROR_INVALID_PASSWORD")]),
        ];

        let nested = group_nested(
            records,
            |r| field_key(r, "USER_NAME"),
            |r| field_key(r, "LOGIN_STATUS"),
        );

        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].key, "kai");
        assert_eq!(nested[0].len(), 3);
        let statuses: Vec<&str> = nested[0].groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(
            statuses,
            vec!["LOGIN_ERROR_INVALID_PASSWORD", "LOGIN_ERROR_RATE_EXCEEDED"]
        );
        assert_eq!(nested[1].key, "mia");
        assert_eq!(nested[1].len(), 1);
    }
}
