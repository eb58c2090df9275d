//! Field registry for the count endpoint.
//!
//! Every [`FieldName`] maps to exactly one measure over a [`Fact`]. How the
//! measure is folded into its group is decided by
//! [`FieldName::accumulation`].

use crime_data_query_models::FieldName;

use crate::QueryError;
use crate::aggregate::Fact;
use crate::params::{parse_list, present};

/// Resolves the raw `fields` parameter into the ordered list of measures
/// to emit.
///
/// An absent or blank `fields` yields [`FieldName::DEFAULT`].
///
/// # Errors
///
/// Returns [`QueryError::InvalidParameter`] naming the first unknown or
/// empty field.
pub fn resolve_fields(fields: Option<&str>) -> Result<Vec<FieldName>, QueryError> {
    present(fields).map_or_else(
        || Ok(FieldName::DEFAULT.to_vec()),
        |raw| parse_list("fields", raw),
    )
}

/// The contribution of a single fact to `field`.
#[must_use]
pub fn measure(field: FieldName, fact: &Fact<'_>) -> u64 {
    match field {
        FieldName::TotalActualCount => 1,
        FieldName::OffenseCount => fact.matched_offenses,
        FieldName::ClearedCount => u64::from(fact.incident.cleared),
        FieldName::LeokaFelony => u64::from(fact.incident.leoka_felony),
        FieldName::LeokaAccident => u64::from(fact.incident.leoka_accident),
        FieldName::LeokaAssault => u64::from(fact.incident.leoka_assault),
    }
}
