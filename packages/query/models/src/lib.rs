#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query parameter, dimension, and field types for the query engine.
//!
//! Grouping dimensions and aggregate fields are closed enums: adding a new
//! variant forces every extraction and accumulation `match` in
//! `crime_data_query` to handle it. Raw request parameters are kept as
//! strings so that validation, and the error naming the bad parameter,
//! happens in one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};

pub mod views;

/// A grouping dimension accepted by the `by` parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dimension {
    /// Calendar year of the incident.
    Year,
    /// Numeric identifier of the owning agency.
    AgencyId,
    /// State abbreviation of the owning agency.
    State,
    /// Offense type name of the contributing offense.
    Offense,
}

impl Dimension {
    /// Grouping used when `by` is absent.
    pub const DEFAULT: &'static [Self] = &[Self::Year];

    /// Whether this dimension is read from the incident or from one of its
    /// offenses.
    #[must_use]
    pub const fn scope(self) -> Scope {
        match self {
            Self::Year | Self::AgencyId | Self::State => Scope::Incident,
            Self::Offense => Scope::Offense,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Year, Self::AgencyId, Self::State, Self::Offense]
    }
}

/// Which entity a dimension value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Read from the incident or its owning agency.
    Incident,
    /// Read from an individual offense.
    Offense,
}

/// A measure that can be requested through the `fields` parameter of the
/// count endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldName {
    /// Number of contributing facts.
    TotalActualCount,
    /// Number of matching offenses carried by the contributing facts.
    OffenseCount,
    /// Number of contributing facts whose incident was cleared.
    ClearedCount,
    /// Officers feloniously killed.
    LeokaFelony,
    /// Officers accidentally killed.
    LeokaAccident,
    /// Officers assaulted.
    LeokaAssault,
}

impl FieldName {
    /// Measures emitted when `fields` is absent.
    pub const DEFAULT: &'static [Self] = &[Self::TotalActualCount];

    /// How often this measure is accumulated within a group.
    #[must_use]
    pub const fn accumulation(self) -> Accumulation {
        match self {
            Self::TotalActualCount | Self::OffenseCount | Self::ClearedCount => {
                Accumulation::PerFact
            }
            Self::LeokaFelony | Self::LeokaAccident | Self::LeokaAssault => {
                Accumulation::PerIncident
            }
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::TotalActualCount,
            Self::OffenseCount,
            Self::ClearedCount,
            Self::LeokaFelony,
            Self::LeokaAccident,
            Self::LeokaAssault,
        ]
    }
}

/// How a measure is folded into its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulation {
    /// Added once for every contributing fact.
    PerFact,
    /// Added once for every distinct incident in the group, no matter how
    /// many of its offenses contribute.
    PerIncident,
}

/// A single grouping-key value.
///
/// Ordering is numeric for [`GroupValue::Int`] and lexicographic for
/// [`GroupValue::Text`]. A given dimension always yields the same variant,
/// so mixed comparisons never decide row order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupValue {
    /// Integer key (years, agency ids).
    Int(i64),
    /// Text key (states, offense names).
    Text(String),
}

/// One output row of the count endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow {
    /// Grouping-key values in resolved dimension order.
    pub keys: Vec<(Dimension, GroupValue)>,
    /// Accumulated measures, one entry per field in the registry.
    pub measures: BTreeMap<FieldName, u64>,
}

impl AggregateRow {
    /// Returns the value of `field`, or zero if nothing contributed to it.
    #[must_use]
    pub fn measure(&self, field: FieldName) -> u64 {
        self.measures.get(&field).copied().unwrap_or(0)
    }

    /// Returns the key value for `dimension`, if it is part of the grouping.
    #[must_use]
    pub fn key(&self, dimension: Dimension) -> Option<&GroupValue> {
        self.keys
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, v)| v)
    }
}

/// Query parameters for the agency listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// 1-indexed page number.
    pub page: Option<String>,
    /// Items per page.
    pub page_size: Option<String>,
    /// Comma-separated field projection.
    pub fields: Option<String>,
}

/// Query parameters for the incident listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentListParams {
    /// NIBRS offense code filter, e.g. `35A`.
    pub offense_code: Option<String>,
    /// Incident year filter.
    pub year: Option<String>,
    /// Agency state filter.
    pub state: Option<String>,
    /// Agency ORI filter.
    pub ori: Option<String>,
    /// 1-indexed page number.
    pub page: Option<String>,
    /// Items per page.
    pub page_size: Option<String>,
    /// Comma-separated field projection.
    pub fields: Option<String>,
}

/// Query parameters for the count endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountParams {
    /// Comma-separated grouping dimensions.
    pub by: Option<String>,
    /// Comma-separated measures to emit.
    pub fields: Option<String>,
    /// NIBRS offense code filter, e.g. `35A`.
    pub offense_code: Option<String>,
    /// Incident year filter.
    pub year: Option<String>,
    /// Agency state filter.
    pub state: Option<String>,
    /// Agency ORI filter.
    pub ori: Option<String>,
    /// 1-indexed page number.
    pub page: Option<String>,
    /// Items per page.
    pub page_size: Option<String>,
}

/// Filter parameters shared by the incident listing and the count
/// endpoint.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    /// NIBRS offense code filter.
    pub offense_code: Option<String>,
    /// Incident year filter.
    pub year: Option<String>,
    /// Agency state filter.
    pub state: Option<String>,
    /// Agency ORI filter.
    pub ori: Option<String>,
}

impl From<&IncidentListParams> for FilterParams {
    fn from(p: &IncidentListParams) -> Self {
        Self {
            offense_code: p.offense_code.clone(),
            year: p.year.clone(),
            state: p.state.clone(),
            ori: p.ori.clone(),
        }
    }
}

impl From<&CountParams> for FilterParams {
    fn from(p: &CountParams) -> Self {
        Self {
            offense_code: p.offense_code.clone(),
            year: p.year.clone(),
            state: p.state.clone(),
            ori: p.ori.clone(),
        }
    }
}
