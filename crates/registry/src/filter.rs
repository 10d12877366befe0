//! Query filter and time-range validation.
//!
//! A [`Filter`] carries set-membership constraints plus an optional
//! timestamp range. Absent fields mean "no constraint on that dimension";
//! an inconsistent pair of time bounds is an input error with one of four
//! fixed messages, checked by [`TimeRange::validated`] before the compiler
//! adds the range clause.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::normalize;

/// Set-membership constraints plus an optional timestamp range.
///
/// Each list is an ordered sequence; an empty or absent list leaves its
/// dimension unconstrained.
///
/// # Example
///
/// ```
/// use formledger_registry::Filter;
///
/// let filter = Filter::builder()
///     .type_forms(vec!["survey".into()])
///     .hashes(vec!["ab12".into(), "cd34".into()])
///     .build();
/// assert!(filter.ids.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct Filter {
    /// Restrict to these asset ids.
    #[serde(default)]
    #[builder(default)]
    pub ids: Vec<String>,

    /// Restrict to these form kinds.
    #[serde(default)]
    #[builder(default)]
    pub type_forms: Vec<String>,

    /// Restrict to these insertion kinds.
    #[serde(default)]
    #[builder(default)]
    pub insertion_types: Vec<String>,

    /// Restrict to these content hashes.
    #[serde(default)]
    #[builder(default)]
    pub hashes: Vec<String>,

    /// Restrict to assets captured inside this time window.
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

impl Filter {
    /// Space-strips every string in every set field.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |values: Vec<String>| -> Vec<String> {
            values.iter().map(|value| normalize(value)).collect()
        };

        Self {
            ids: clean(self.ids),
            type_forms: clean(self.type_forms),
            insertion_types: clean(self.insertion_types),
            hashes: clean(self.hashes),
            time_range: self.time_range,
        }
    }
}

/// Inclusive timestamp window. Either bound may be unset, but only together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Earliest admissible timestamp.
    #[serde(default)]
    pub min: Option<DateTime<Utc>>,

    /// Latest admissible timestamp.
    #[serde(default)]
    pub max: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Creates a fully-bounded window.
    #[must_use]
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    /// Checks the bounds, returning them when the window is usable.
    ///
    /// `Ok(None)` means both bounds are unset: no constraint, not an error.
    pub fn validated(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, TimeRangeError> {
        match (self.min, self.max) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(TimeRangeError::MaxMissing),
            (None, Some(_)) => Err(TimeRangeError::MinMissing),
            (Some(min), Some(max)) if min > max => Err(TimeRangeError::MinAfterMax),
            (Some(min), Some(max)) if min == max => Err(TimeRangeError::EqualBounds),
            (Some(min), Some(max)) => Ok(Some((min, max))),
        }
    }
}

/// Logically inconsistent time-range bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    /// The minimum is set but the maximum is not.
    #[error("maximum bound missing while minimum is set")]
    MaxMissing,

    /// The maximum is set but the minimum is not.
    #[error("minimum bound missing while maximum is set")]
    MinMissing,

    /// The minimum is strictly after the maximum.
    #[error("minimum must not be after maximum")]
    MinAfterMax,

    /// The bounds are equal.
    #[error("bounds must not be equal")]
    EqualBounds,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_payload_fields_mean_no_constraint() {
        let filter: Filter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter, Filter::default());

        let filter: Filter = serde_json::from_str(r#"{"ids":["a-1"]}"#).unwrap();
        assert_eq!(filter.ids, ["a-1"]);
        assert!(filter.time_range.is_none());
    }

    #[test]
    fn test_normalized_strips_every_set_element() {
        let filter = Filter::builder()
            .ids(vec![" a 1 ".into(), "b2".into()])
            .hashes(vec!["a b".into()])
            .build()
            .normalized();

        assert_eq!(filter.ids, ["a1", "b2"]);
        assert_eq!(filter.hashes, ["ab"]);
    }

    #[test]
    fn test_half_open_time_range_decodes_with_unset_bound() {
        let filter: Filter =
            serde_json::from_str(r#"{"time_range":{"min":"2024-03-01T10:00:00Z"}}"#).unwrap();
        let range = filter.time_range.unwrap();
        assert!(range.min.is_some());
        assert!(range.max.is_none());
        assert_eq!(range.validated(), Err(TimeRangeError::MaxMissing));
    }
}
