//! Ordering and truncation of summary records.
//!
//! Reports sort on output field names (`count`, `cpu`, `name`, ...) rather
//! than source columns. The sort is stable, so ties keep the aggregator's
//! emission order, which in turn is the grouping engine's first-seen order.

use crate::pipeline::Summary;
use serde_json::Value;
use std::cmp::Ordering;

/// Sort summaries on one or more fields, left to right as tie-breakers.
///
/// Descending is the default direction for every report; `ascending` is the
/// explicit override and applies to all fields at once. Unknown or missing
/// fields compare as smallest, which puts them last in a descending run.
pub fn sort_summaries(mut summaries: Vec<Summary>, fields: &[String], ascending: bool) -> Vec<Summary> {
    if fields.is_empty() {
        return summaries;
    }

    summaries.sort_by(|a, b| {
        let mut ordering = Ordering::Equal;
        for field in fields {
            ordering = compare_values(a.get(field), b.get(field));
            if ordering != Ordering::Equal {
                break;
            }
        }
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });

    summaries
}

/// Keep the first `n` summaries; `None` is a no-op.
pub fn apply_limit(mut summaries: Vec<Summary>, n: Option<usize>) -> Vec<Summary> {
    if let Some(n) = n {
        summaries.truncate(n);
    }
    summaries
}

/// Compare two optional summary values.
///
/// Numeric when both sides carry a number (JSON number or numeric string),
/// lexical otherwise. Absent values order before any present value.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => text_form(a).cmp(&text_form(b)),
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
