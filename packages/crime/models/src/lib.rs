#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! NIBRS entity types and the offense category taxonomy.
//!
//! These are the read-only reference and fact types shared across the
//! crime data workspace: reporting agencies, incidents, the offenses that
//! make up an incident, and the static offense type and location lookup
//! tables. Everything here is owned by the record store and only ever read
//! by the query engine.

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// FBI crime-against grouping for NIBRS offense codes.
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
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OffenseCategory {
    /// Homicide, assault, sex offenses, kidnapping, human trafficking
    Person,
    /// Robbery, burglary, theft, fraud, arson, vandalism, stolen property
    Property,
    /// Drug/narcotic, gambling, pornography, prostitution, weapon law
    Society,
    /// Group B offenses and anything without a Group A code
    Other,
}

impl OffenseCategory {
    /// Classifies a NIBRS offense code (e.g. `"35A"`, `"13B"`, `"220"`).
    ///
    /// Codes are matched case-insensitively. Unrecognized codes fall into
    /// [`OffenseCategory::Other`].
    #[must_use]
    pub fn from_nibrs_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "09A" | "09B" | "09C" | "100" | "11A" | "11B" | "11C" | "11D" | "13A" | "13B"
            | "13C" | "36A" | "36B" | "64A" | "64B" => Self::Person,

            "120" | "200" | "210" | "220" | "23A" | "23B" | "23C" | "23D" | "23E" | "23F"
            | "23G" | "23H" | "240" | "250" | "26A" | "26B" | "26C" | "26D" | "26E" | "26F"
            | "26G" | "26H" | "270" | "280" | "290" | "510" => Self::Property,

            "35A" | "35B" | "370" | "39A" | "39B" | "39C" | "39D" | "40A" | "40B" | "40C"
            | "520" | "720" => Self::Society,

            _ => Self::Other,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Person, Self::Property, Self::Society, Self::Other]
    }
}

/// A law-enforcement reporting agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    /// Store-assigned numeric identifier.
    pub agency_id: i64,
    /// Originating agency identifier (unique natural key).
    pub ori: String,
    /// Display name.
    pub name: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// City the agency is based in, if any.
    #[serde(default)]
    pub city: Option<String>,
    /// Agency type (e.g. `"City"`, `"County"`, `"University or College"`).
    #[serde(default)]
    pub agency_type: Option<String>,
    /// Population covered by the agency.
    #[serde(default)]
    pub population: Option<u64>,
}

/// A row in the static offense type lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseType {
    /// NIBRS offense code, e.g. `"35A"`.
    pub offense_code: String,
    /// Human-readable offense name, e.g. `"Drug/Narcotic Violations"`.
    pub offense_name: String,
}

impl OffenseType {
    /// Returns the crime-against category for this offense type.
    #[must_use]
    pub fn category(&self) -> OffenseCategory {
        OffenseCategory::from_nibrs_code(&self.offense_code)
    }
}

/// A row in the static location lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location code.
    pub location_code: String,
    /// Human-readable location name, e.g. `"Residence/Home"`.
    pub location_name: String,
}

/// A single criminal act within an [`Incident`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offense {
    /// What kind of offense this is.
    pub offense_type: OffenseType,
    /// Where it happened.
    pub location: Location,
}

/// A reported crime event owned by an [`Agency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique incident number.
    pub incident_number: String,
    /// ORI of the owning agency.
    pub ori: String,
    /// Date the incident occurred.
    pub incident_date: NaiveDate,
    /// Whether the incident was cleared by arrest or exceptionally.
    pub cleared: bool,
    /// Officers feloniously killed in connection with this incident.
    pub leoka_felony: u32,
    /// Officers accidentally killed in connection with this incident.
    pub leoka_accident: u32,
    /// Officers assaulted in connection with this incident.
    pub leoka_assault: u32,
    /// Offenses that make up the incident.
    pub offenses: Vec<Offense>,
}

impl Incident {
    /// Calendar year the incident occurred in.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.incident_date.year()
    }
}
