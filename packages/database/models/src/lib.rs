#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! On-disk snapshot document types.
//!
//! A snapshot document is the normalized JSON form of the record store:
//! agencies, the offense type and location lookup tables, and incidents
//! whose offenses reference those tables by code. These types are distinct
//! from the resolved entity types in `crime_data_crime_models`, where every
//! reference has already been looked up.

use chrono::NaiveDate;
use crime_data_crime_models::{Agency, Location, OffenseType};
use serde::{Deserialize, Serialize};

/// The full normalized contents of a record store snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Reporting agencies.
    #[serde(default)]
    pub agencies: Vec<Agency>,
    /// Offense type lookup table.
    #[serde(default)]
    pub offense_types: Vec<OffenseType>,
    /// Location lookup table.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Incident facts.
    #[serde(default)]
    pub incidents: Vec<IncidentRecord>,
}

/// An incident as stored, with offenses referencing lookup tables by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Unique incident number.
    pub incident_number: String,
    /// ORI of the owning agency.
    pub ori: String,
    /// Date the incident occurred.
    pub incident_date: NaiveDate,
    /// Cleared by arrest or exceptionally.
    #[serde(default)]
    pub cleared: bool,
    /// Officers feloniously killed.
    #[serde(default)]
    pub leoka_felony: u32,
    /// Officers accidentally killed.
    #[serde(default)]
    pub leoka_accident: u32,
    /// Officers assaulted.
    #[serde(default)]
    pub leoka_assault: u32,
    /// Offense rows.
    #[serde(default)]
    pub offenses: Vec<OffenseRecord>,
}

/// An offense row referencing the lookup tables by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseRecord {
    /// Code into the offense type table.
    pub offense_code: String,
    /// Code into the location table.
    pub location_code: String,
}
