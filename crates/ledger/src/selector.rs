//! Reference parser and matcher for the declarative selector wire format.
//!
//! The rich-query executor accepts selectors of the shape
//! `{"selector": {<field>: <scalar> | {"$in": [...]} | {"$gte": .., "$lte": ..}, ...}}`,
//! fields omitted when unconstrained. [`MemoryLedger`](crate::MemoryLedger)
//! evaluates them locally against decoded JSON documents; a production
//! gateway would push the same selector down to its query engine.
//!
//! Range bounds compare chronologically when both sides parse as RFC 3339
//! timestamps, otherwise lexicographically for strings and numerically for
//! numbers. Documents whose field is missing or of a non-comparable type do
//! not match.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};

/// One constraint on a single document field.
#[derive(Debug, Clone)]
enum Condition {
    /// Field must equal the scalar exactly.
    Equals(Value),
    /// Field must equal one of the listed values.
    In(Vec<Value>),
    /// Field must fall inside the (inclusive) bounds that are present.
    Range { gte: Option<Value>, lte: Option<Value> },
}

/// A parsed selector: the conjunction of its field conditions.
#[derive(Debug, Clone)]
pub(crate) struct Selector {
    clauses: Vec<(String, Condition)>,
}

impl Selector {
    /// Parses the selector wire format.
    ///
    /// Unknown operators and malformed envelopes are rejected with
    /// [`GatewayError::Query`], mirroring how a rich-query executor refuses
    /// a selector it cannot plan.
    pub(crate) fn parse(selector: &str) -> GatewayResult<Self> {
        let root: Value = serde_json::from_str(selector)
            .map_err(|e| GatewayError::query(format!("selector is not valid JSON: {e}")))?;

        let envelope = root
            .as_object()
            .ok_or_else(|| GatewayError::query("selector envelope must be an object"))?;
        let body = envelope
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| GatewayError::query("missing \"selector\" object"))?;

        let mut clauses = Vec::with_capacity(body.len());
        for (field, condition) in body {
            clauses.push((field.clone(), Self::parse_condition(field, condition)?));
        }

        Ok(Self { clauses })
    }

    fn parse_condition(field: &str, condition: &Value) -> GatewayResult<Condition> {
        let Some(object) = condition.as_object() else {
            // Bare scalar: exact equality.
            return Ok(Condition::Equals(condition.clone()));
        };

        if let Some(candidates) = object.get("$in") {
            if object.len() != 1 {
                return Err(GatewayError::query(format!(
                    "field {field}: $in cannot be combined with other operators"
                )));
            }
            let list = candidates.as_array().ok_or_else(|| {
                GatewayError::query(format!("field {field}: $in expects an array"))
            })?;
            return Ok(Condition::In(list.clone()));
        }

        let gte = object.get("$gte").cloned();
        let lte = object.get("$lte").cloned();
        let known = usize::from(gte.is_some()) + usize::from(lte.is_some());
        if known != object.len() || known == 0 {
            let unknown = object.keys().find(|k| !matches!(k.as_str(), "$gte" | "$lte"));
            return Err(GatewayError::query(format!(
                "field {field}: unsupported operator {}",
                unknown.map_or_else(|| "(empty condition)".to_string(), ToString::to_string)
            )));
        }

        Ok(Condition::Range { gte, lte })
    }

    /// Returns true when `document` satisfies every clause.
    pub(crate) fn matches(&self, document: &Value) -> bool {
        self.clauses.iter().all(|(field, condition)| {
            document.get(field).is_some_and(|actual| condition.matches(actual))
        })
    }
}

impl Condition {
    fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Equals(expected) => actual == expected,
            Self::In(candidates) => candidates.contains(actual),
            Self::Range { gte, lte } => {
                let above = gte.as_ref().map_or(true, |bound| {
                    compare(actual, bound).is_some_and(Ordering::is_ge)
                });
                let below = lte.as_ref().map_or(true, |bound| {
                    compare(actual, bound).is_some_and(Ordering::is_le)
                });
                above && below
            },
        }
    }
}

/// Orders two JSON scalars, or `None` when they are not comparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => match (parse_rfc3339(a), parse_rfc3339(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc() -> Value {
        json!({
            "id": "asset-1",
            "type_form": "survey",
            "timestamp": "2024-03-01T10:00:00Z",
            "weight": 12.5,
        })
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = Selector::parse(r#"{"selector":{}}"#).unwrap();
        assert!(selector.matches(&doc()));
        assert!(selector.matches(&json!({})));
    }

    #[test]
    fn test_scalar_equality() {
        let selector = Selector::parse(r#"{"selector":{"id":"asset-1"}}"#).unwrap();
        assert!(selector.matches(&doc()));

        let selector = Selector::parse(r#"{"selector":{"id":"asset-2"}}"#).unwrap();
        assert!(!selector.matches(&doc()));
    }

    #[test]
    fn test_in_membership() {
        let selector =
            Selector::parse(r#"{"selector":{"type_form":{"$in":["survey","census"]}}}"#).unwrap();
        assert!(selector.matches(&doc()));

        let selector = Selector::parse(r#"{"selector":{"type_form":{"$in":["census"]}}}"#).unwrap();
        assert!(!selector.matches(&doc()));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let selector = Selector::parse(r#"{"selector":{"hash":{"$in":["h1"]}}}"#).unwrap();
        assert!(!selector.matches(&doc()));
    }

    #[test]
    fn test_timestamp_range_is_chronological_not_lexicographic() {
        // Mixed precision breaks lexicographic ordering: "..00.500Z" sorts
        // before "..00Z" as a string but after it on the timeline.
        let selector = Selector::parse(
            r#"{"selector":{"timestamp":{"$gte":"2024-03-01T10:00:00.500Z","$lte":"2024-03-01T11:00:00Z"}}}"#,
        )
        .unwrap();
        assert!(!selector.matches(&doc()));

        let selector = Selector::parse(
            r#"{"selector":{"timestamp":{"$gte":"2024-03-01T09:00:00.500Z","$lte":"2024-03-01T11:00:00Z"}}}"#,
        )
        .unwrap();
        assert!(selector.matches(&doc()));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let selector = Selector::parse(
            r#"{"selector":{"timestamp":{"$gte":"2024-03-01T10:00:00Z","$lte":"2024-03-01T10:00:00Z"}}}"#,
        )
        .unwrap();
        assert!(selector.matches(&doc()));
    }

    #[test]
    fn test_numeric_range() {
        let selector =
            Selector::parse(r#"{"selector":{"weight":{"$gte":10,"$lte":20}}}"#).unwrap();
        assert!(selector.matches(&doc()));

        let selector =
            Selector::parse(r#"{"selector":{"weight":{"$gte":13,"$lte":20}}}"#).unwrap();
        assert!(!selector.matches(&doc()));
    }

    #[test]
    fn test_conjunction_of_clauses() {
        let selector = Selector::parse(
            r#"{"selector":{"id":{"$in":["asset-1"]},"type_form":{"$in":["census"]}}}"#,
        )
        .unwrap();
        assert!(!selector.matches(&doc()));
    }

    #[test]
    fn test_malformed_selectors_are_rejected() {
        assert!(Selector::parse("not json").is_err());
        assert!(Selector::parse(r#"{"wrong":{}}"#).is_err());
        assert!(Selector::parse(r#"{"selector":{"id":{"$regex":"a.*"}}}"#).is_err());
        assert!(Selector::parse(r#"{"selector":{"id":{"$in":"not-an-array"}}}"#).is_err());
        assert!(Selector::parse(r#"{"selector":{"id":{"$in":[],"$gte":"x"}}}"#).is_err());
    }
}
