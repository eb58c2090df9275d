//! Grouping dimension resolution and key extraction.

use crime_data_query_models::{Dimension, GroupValue};

use crate::QueryError;
use crate::aggregate::Fact;
use crate::params::{parse_list, present};

/// Resolves the raw `by` parameter into an ordered, de-duplicated list of
/// dimensions.
///
/// An absent or blank `by` groups by [`Dimension::DEFAULT`] (`year`).
///
/// # Errors
///
/// Returns [`QueryError::InvalidParameter`] naming the first unknown or
/// empty token.
pub fn resolve_dimensions(by: Option<&str>) -> Result<Vec<Dimension>, QueryError> {
    present(by).map_or_else(|| Ok(Dimension::DEFAULT.to_vec()), |raw| parse_list("by", raw))
}

/// Reads the key value for `dimension` from a fact.
///
/// Returns `None` only for an offense-scoped dimension on a fact that
/// carries no offense; such a fact cannot be placed in a group.
#[must_use]
pub fn extract(dimension: Dimension, fact: &Fact<'_>) -> Option<GroupValue> {
    match dimension {
        Dimension::Year => Some(GroupValue::Int(i64::from(fact.incident.year()))),
        Dimension::AgencyId => Some(GroupValue::Int(fact.agency.agency_id)),
        Dimension::State => Some(GroupValue::Text(fact.agency.state.clone())),
        Dimension::Offense => fact
            .offense
            .map(|offense| GroupValue::Text(offense.offense_type.offense_name.clone())),
    }
}
