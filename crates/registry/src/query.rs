//! Filter-to-selector query compiler.
//!
//! Turns a structured [`Filter`] into the ledger's declarative selector
//! wire format:
//! `{"selector":{<field>: {"$in":[...]} | {"$gte":..,"$lte":..}, ...}}`.
//!
//! Clauses are emitted in a fixed order (`hash`, `type_form`,
//! `insertion_type`, `id`, `timestamp`): they are fields of a serde struct
//! and serialize in declaration order, so the output is byte-identical for
//! identical input regardless of how the filter was built.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::{RegistryError, RegistryResult},
    filter::Filter,
};

/// Wire envelope of the rich query.
#[derive(Serialize)]
struct RichQuery {
    selector: Clauses,
}

/// Field declaration order here is the selector's clause order.
#[derive(Serialize, Default)]
struct Clauses {
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<SetClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_form: Option<SetClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insertion_type: Option<SetClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<SetClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<RangeClause>,
}

/// Set-membership clause.
#[derive(Serialize)]
struct SetClause {
    #[serde(rename = "$in")]
    any_of: Vec<String>,
}

/// Inclusive timestamp-window clause.
#[derive(Serialize)]
struct RangeClause {
    #[serde(rename = "$gte")]
    min: DateTime<Utc>,
    #[serde(rename = "$lte")]
    max: DateTime<Utc>,
}

/// Compiles `filter` into a selector string.
///
/// Every set element is space-stripped first; empty sets add no clause, and
/// a filter with no constraints compiles to the match-everything selector
/// `{"selector":{}}`.
///
/// # Errors
///
/// - [`RegistryError::TimeRange`] when the time bounds are inconsistent (see
///   [`TimeRangeError`](crate::TimeRangeError) for the cases)
/// - [`RegistryError::Encode`] when the selector cannot be serialized
pub fn compile(filter: &Filter) -> RegistryResult<String> {
    let filter = filter.clone().normalized();

    let timestamp = match &filter.time_range {
        None => None,
        Some(range) => range.validated()?.map(|(min, max)| RangeClause { min, max }),
    };
    let set = |values: Vec<String>| (!values.is_empty()).then(|| SetClause { any_of: values });

    let query = RichQuery {
        selector: Clauses {
            hash: set(filter.hashes),
            type_form: set(filter.type_forms),
            insertion_type: set(filter.insertion_types),
            id: set(filter.ids),
            timestamp,
        },
    };

    serde_json::to_string(&query).map_err(|source| RegistryError::encode("compiled query", source))
}
