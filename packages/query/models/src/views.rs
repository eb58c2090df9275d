//! Serialized record shapes for the listing and lookup endpoints.
//!
//! Each view has a matching field enum naming its top-level columns, which
//! is the vocabulary the `fields` projection is validated against.

use chrono::NaiveDate;
use crime_data_crime_models::{Agency, Incident, Location, Offense, OffenseCategory, OffenseType};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};

/// An agency as returned by the listing and lookup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiAgency {
    /// Store-assigned numeric identifier.
    pub agency_id: i64,
    /// Originating agency identifier.
    pub ori: String,
    /// Display name.
    pub name: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// City.
    pub city: Option<String>,
    /// Agency type.
    pub agency_type: Option<String>,
    /// Covered population.
    pub population: Option<u64>,
}

impl From<&Agency> for ApiAgency {
    fn from(agency: &Agency) -> Self {
        Self {
            agency_id: agency.agency_id,
            ori: agency.ori.clone(),
            name: agency.name.clone(),
            state: agency.state.clone(),
            city: agency.city.clone(),
            agency_type: agency.agency_type.clone(),
            population: agency.population,
        }
    }
}

/// Top-level columns of [`ApiAgency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum AgencyField {
    /// `agency_id`
    AgencyId,
    /// `ori`
    Ori,
    /// `name`
    Name,
    /// `state`
    State,
    /// `city`
    City,
    /// `agency_type`
    AgencyType,
    /// `population`
    Population,
}

/// The owning agency embedded in an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiAgencySummary {
    /// Store-assigned numeric identifier.
    pub agency_id: i64,
    /// Originating agency identifier.
    pub ori: String,
    /// Display name.
    pub name: String,
    /// Two-letter state abbreviation.
    pub state: String,
}

impl From<&Agency> for ApiAgencySummary {
    fn from(agency: &Agency) -> Self {
        Self {
            agency_id: agency.agency_id,
            ori: agency.ori.clone(),
            name: agency.name.clone(),
            state: agency.state.clone(),
        }
    }
}

/// An offense type lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiOffenseType {
    /// NIBRS offense code.
    pub offense_code: String,
    /// Human-readable offense name.
    pub offense_name: String,
    /// Crime-against category derived from the code.
    pub offense_category: OffenseCategory,
}

impl From<&OffenseType> for ApiOffenseType {
    fn from(offense_type: &OffenseType) -> Self {
        Self {
            offense_code: offense_type.offense_code.clone(),
            offense_name: offense_type.offense_name.clone(),
            offense_category: offense_type.category(),
        }
    }
}

/// Top-level columns of [`ApiOffenseType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum OffenseTypeField {
    /// `offense_code`
    OffenseCode,
    /// `offense_name`
    OffenseName,
    /// `offense_category`
    OffenseCategory,
}

/// A location lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiLocation {
    /// Location code.
    pub location_code: String,
    /// Human-readable location name.
    pub location_name: String,
}

impl From<&Location> for ApiLocation {
    fn from(location: &Location) -> Self {
        Self {
            location_code: location.location_code.clone(),
            location_name: location.location_name.clone(),
        }
    }
}

/// An offense embedded in an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiOffense {
    /// Offense type.
    pub offense_type: ApiOffenseType,
    /// Location.
    pub location: ApiLocation,
}

impl From<&Offense> for ApiOffense {
    fn from(offense: &Offense) -> Self {
        Self {
            offense_type: ApiOffenseType::from(&offense.offense_type),
            location: ApiLocation::from(&offense.location),
        }
    }
}

/// An incident as returned by the listing and lookup endpoints.
///
/// All offenses of the incident are embedded, including ones that did not
/// match an `offense_code` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiIncident {
    /// Unique incident number.
    pub incident_number: String,
    /// Calendar year.
    pub year: i32,
    /// Date the incident occurred.
    pub incident_date: NaiveDate,
    /// Cleared by arrest or exceptionally.
    pub cleared: bool,
    /// Officers feloniously killed.
    pub leoka_felony: u32,
    /// Officers accidentally killed.
    pub leoka_accident: u32,
    /// Officers assaulted.
    pub leoka_assault: u32,
    /// Owning agency.
    pub agency: ApiAgencySummary,
    /// Offenses making up the incident.
    pub offenses: Vec<ApiOffense>,
}

impl ApiIncident {
    /// Builds the view of `incident` owned by `agency`.
    #[must_use]
    pub fn new(incident: &Incident, agency: &Agency) -> Self {
        Self {
            incident_number: incident.incident_number.clone(),
            year: incident.year(),
            incident_date: incident.incident_date,
            cleared: incident.cleared,
            leoka_felony: incident.leoka_felony,
            leoka_accident: incident.leoka_accident,
            leoka_assault: incident.leoka_assault,
            agency: ApiAgencySummary::from(agency),
            offenses: incident.offenses.iter().map(ApiOffense::from).collect(),
        }
    }
}

/// Top-level columns of [`ApiIncident`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum IncidentField {
    /// `incident_number`
    IncidentNumber,
    /// `year`
    Year,
    /// `incident_date`
    IncidentDate,
    /// `cleared`
    Cleared,
    /// `leoka_felony`
    LeokaFelony,
    /// `leoka_accident`
    LeokaAccident,
    /// `leoka_assault`
    LeokaAssault,
    /// `agency`
    Agency,
    /// `offenses`
    Offenses,
}
