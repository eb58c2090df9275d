//! Deterministic sample data for tests.
//!
//! The sample spans five states, three years, and nine offense types
//! (including `35A`). Incident numbers are zero-padded so their string
//! order matches their generation order.

use chrono::NaiveDate;
use crime_data_crime_models::{Agency, Location, OffenseType};
use crime_data_database_models::{IncidentRecord, OffenseRecord, SnapshotDocument};

use crate::{MemoryStore, Snapshot};

/// Number of agencies in the sample document.
pub const AGENCY_COUNT: usize = 25;

/// Number of incidents in the sample document.
pub const INCIDENT_COUNT: usize = 72;

/// Years covered by the sample incidents.
pub const YEARS: &[i32] = &[2013, 2014, 2015];

const STATES: &[&str] = &["DC", "MD", "OH", "TX", "VA"];

const OFFENSE_TYPES: &[(&str, &str)] = &[
    ("09A", "Murder and Nonnegligent Manslaughter"),
    ("13A", "Aggravated Assault"),
    ("13B", "Simple Assault"),
    ("220", "Burglary/Breaking & Entering"),
    ("23H", "All Other Larceny"),
    ("35A", "Drug/Narcotic Violations"),
    ("35B", "Drug Equipment Violations"),
    ("290", "Destruction/Damage/Vandalism of Property"),
    ("90Z", "All Other Offenses"),
];

const LOCATIONS: &[(&str, &str)] = &[
    ("12", "Grocery/Supermarket"),
    ("13", "Highway/Road/Alley/Street/Sidewalk"),
    ("18", "Parking/Drop Lot/Garage"),
    ("20", "Residence/Home"),
    ("25", "Other/Unknown"),
];

/// Builds the sample snapshot document.
#[must_use]
pub fn sample_document() -> SnapshotDocument {
    let agencies: Vec<Agency> = (0..AGENCY_COUNT)
        .map(|i| {
            let state = STATES[i % STATES.len()];
            Agency {
                agency_id: i64::try_from(1000 + i).unwrap_or_default(),
                ori: format!("{state}{:07}", i * 100),
                name: format!("{state} Agency {i:02}"),
                state: state.to_string(),
                city: Some(format!("City {i:02}")),
                agency_type: Some(if i % 3 == 0 { "County" } else { "City" }.to_string()),
                population: Some(10_000 + u64::try_from(i).unwrap_or_default() * 1_500),
            }
        })
        .collect();

    let offense_types = OFFENSE_TYPES
        .iter()
        .map(|(code, name)| OffenseType {
            offense_code: (*code).to_string(),
            offense_name: (*name).to_string(),
        })
        .collect();

    let locations = LOCATIONS
        .iter()
        .map(|(code, name)| Location {
            location_code: (*code).to_string(),
            location_name: (*name).to_string(),
        })
        .collect();

    let incidents = (0..INCIDENT_COUNT)
        .map(|i| {
            let agency = &agencies[i % AGENCY_COUNT];
            let year = YEARS[i % YEARS.len()];
            let month = u32::try_from(i % 12).unwrap_or_default() + 1;
            let day = u32::try_from(i % 28).unwrap_or_default() + 1;
            let offenses = (0..1 + i % 3)
                .map(|k| OffenseRecord {
                    offense_code: OFFENSE_TYPES[(i + k * 4) % OFFENSE_TYPES.len()]
                        .0
                        .to_string(),
                    location_code: LOCATIONS[(i + k) % LOCATIONS.len()].0.to_string(),
                })
                .collect();

            IncidentRecord {
                incident_number: format!("INC-{i:05}"),
                ori: agency.ori.clone(),
                incident_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
                cleared: i % 4 == 0,
                leoka_felony: u32::from(i % 17 == 0),
                leoka_accident: u32::from(i % 23 == 0),
                leoka_assault: u32::from(i % 5 == 0) * 2,
                offenses,
            }
        })
        .collect();

    SnapshotDocument {
        agencies,
        offense_types,
        locations,
        incidents,
    }
}

/// Builds the resolved sample snapshot.
///
/// # Panics
///
/// Panics if the sample document fails validation.
#[must_use]
pub fn sample_snapshot() -> Snapshot {
    Snapshot::from_document(sample_document()).expect("sample document is valid")
}

/// Builds a [`MemoryStore`] serving the sample snapshot.
#[must_use]
pub fn sample_store() -> MemoryStore {
    MemoryStore::new(sample_snapshot())
}
