//! Field/value predicates over summary records.
//!
//! Built for optional CLI filters: `field_opt` with `None` adds nothing, so
//! call sites chain clauses without branching on which flags were given.

use crate::pipeline::Summary;
use serde_json::Value;

#[derive(Debug, Clone)]
enum Match {
    Eq(Value),
    In(Vec<Value>),
}

/// AND-ed field predicates; an empty predicate matches everything.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    clauses: Vec<(String, Match)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require exact equality on a field.
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((name.to_string(), Match::Eq(value.into())));
        self
    }

    /// Require the field's value to be a member of `values`.
    pub fn field_in(mut self, name: &str, values: Vec<Value>) -> Self {
        self.clauses.push((name.to_string(), Match::In(values)));
        self
    }

    /// Like [`field`](Self::field), but `None` is a no-op clause.
    pub fn field_opt(self, name: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True when every clause holds. A clause on a field the summary lacks
    /// does not hold.
    pub fn matches(&self, summary: &Summary) -> bool {
        self.clauses.iter().all(|(field, matcher)| {
            let Some(actual) = summary.get(field) else {
                return false;
            };
            match matcher {
                Match::Eq(expected) => actual == expected,
                Match::In(expected) => expected.contains(actual),
            }
        })
    }
}

/// Keep the summaries matching `predicate`, order preserved.
pub fn apply_filter(summaries: Vec<Summary>, predicate: &Predicate) -> Vec<Summary> {
    if predicate.is_empty() {
        return summaries;
    }
    summaries
        .into_iter()
        .filter(|summary| predicate.matches(summary))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(field: &str, value: &str) -> Summary {
        let mut s = Summary::new();
        s.insert(field.to_string(), Value::from(value));
        s
    }

    #[test]
    fn test_array_predicate_keeps_members_in_order() {
        let input = vec![
            summary("field", "foo"),
            summary("field", "bar"),
            summary("field", "baz"),
        ];
        let predicate =
            Predicate::new().field_in("field", vec![Value::from("foo"), Value::from("baz")]);

        let kept = apply_filter(input, &predicate);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0]["field"], Value::from("foo"));
        assert_eq!(kept[1]["field"], Value::from("baz"));
    }

    #[test]
    fn test_scalar_predicate_is_exact_equality() {
        let input = vec![summary("field", "foo"), summary("field", "foobar")];
        let predicate = Predicate::new().field("field", "foo");

        let kept = apply_filter(input, &predicate);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["field"], Value::from("foo"));
    }

    #[test]
    fn test_none_valued_clause_matches_everything() {
        let input = vec![summary("field", "foo"), summary("field", "bar")];
        let predicate = Predicate::new().field_opt("field", None::<&str>);

        assert!(predicate.is_empty());
        assert_eq!(apply_filter(input, &predicate).len(), 2);
    }

    #[test]
    fn test_clauses_are_anded() {
        let mut both = summary("a", "1");
        both.insert("b".to_string(), Value::from("2"));
        let input = vec![both, summary("a", "1")];

        let predicate = Predicate::new().field("a", "1").field("b", "2");
        let kept = apply_filter(input, &predicate);

        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_missing_field_never_matches() {
        let input = vec![summary("other", "x")];
        let predicate = Predicate::new().field("field", "x");

        assert!(apply_filter(input, &predicate).is_empty());
    }
}
