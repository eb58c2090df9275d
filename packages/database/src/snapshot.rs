//! Resolved, validated snapshot of the record store.
//!
//! [`Snapshot::from_document`] turns a normalized [`SnapshotDocument`] into
//! fully resolved entities, rejecting duplicate keys and dangling
//! references. All tables are keyed by their natural key in a `BTreeMap`,
//! which gives every listing its stable ascending order.

use std::collections::{BTreeMap, BTreeSet};

use crime_data_crime_models::{Agency, Incident, Location, Offense, OffenseType};
use crime_data_database_models::{IncidentRecord, SnapshotDocument};

use crate::DbError;

/// A point-in-time, read-only view of every record the API serves.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    agencies: BTreeMap<String, Agency>,
    incidents: BTreeMap<String, Incident>,
    offense_types: BTreeMap<String, OffenseType>,
    locations: BTreeMap<String, Location>,
}

impl Snapshot {
    /// Resolves and validates a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Integrity`] if any natural key is duplicated or
    /// any incident or offense references a row that does not exist.
    pub fn from_document(doc: SnapshotDocument) -> Result<Self, DbError> {
        let mut agencies = BTreeMap::new();
        let mut agency_ids = BTreeSet::new();
        for mut agency in doc.agencies {
            agency.ori = normalize_ori(&agency.ori);
            if !agency_ids.insert(agency.agency_id) {
                return Err(integrity(format!(
                    "duplicate agency_id {}",
                    agency.agency_id
                )));
            }
            if let Some(dup) = agencies.insert(agency.ori.clone(), agency) {
                return Err(integrity(format!("duplicate agency ori {}", dup.ori)));
            }
        }

        let mut offense_types = BTreeMap::new();
        for offense_type in doc.offense_types {
            if let Some(dup) = offense_types.insert(offense_type.offense_code.clone(), offense_type)
            {
                return Err(integrity(format!(
                    "duplicate offense_code {}",
                    dup.offense_code
                )));
            }
        }

        let mut locations = BTreeMap::new();
        for location in doc.locations {
            if let Some(dup) = locations.insert(location.location_code.clone(), location) {
                return Err(integrity(format!(
                    "duplicate location_code {}",
                    dup.location_code
                )));
            }
        }

        let mut incidents = BTreeMap::new();
        for record in doc.incidents {
            let incident = resolve_incident(record, &agencies, &offense_types, &locations)?;
            if let Some(dup) = incidents.insert(incident.incident_number.clone(), incident) {
                return Err(integrity(format!(
                    "duplicate incident_number {}",
                    dup.incident_number
                )));
            }
        }

        log::debug!(
            "Resolved snapshot: {} agencies, {} incidents, {} offense types, {} locations",
            agencies.len(),
            incidents.len(),
            offense_types.len(),
            locations.len(),
        );

        Ok(Self {
            agencies,
            incidents,
            offense_types,
            locations,
        })
    }

    /// Agencies ordered by `ori` ascending.
    pub fn agencies(&self) -> impl Iterator<Item = &Agency> {
        self.agencies.values()
    }

    /// Looks up an agency by ORI. ORIs are stored upper-cased.
    #[must_use]
    pub fn agency(&self, ori: &str) -> Option<&Agency> {
        self.agencies.get(ori)
    }

    /// Incidents ordered by `incident_number` ascending.
    pub fn incidents(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values()
    }

    /// Looks up an incident by incident number.
    #[must_use]
    pub fn incident(&self, incident_number: &str) -> Option<&Incident> {
        self.incidents.get(incident_number)
    }

    /// Offense types ordered by `offense_code` ascending.
    pub fn offense_types(&self) -> impl Iterator<Item = &OffenseType> {
        self.offense_types.values()
    }

    /// Locations ordered by `location_code` ascending.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Number of agencies.
    #[must_use]
    pub fn agency_count(&self) -> usize {
        self.agencies.len()
    }

    /// Number of incidents.
    #[must_use]
    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }
}

fn resolve_incident(
    mut record: IncidentRecord,
    agencies: &BTreeMap<String, Agency>,
    offense_types: &BTreeMap<String, OffenseType>,
    locations: &BTreeMap<String, Location>,
) -> Result<Incident, DbError> {
    record.ori = normalize_ori(&record.ori);
    if !agencies.contains_key(&record.ori) {
        return Err(integrity(format!(
            "incident {} references unknown agency {}",
            record.incident_number, record.ori
        )));
    }

    let mut offenses = Vec::with_capacity(record.offenses.len());
    for offense in &record.offenses {
        let offense_type = offense_types.get(&offense.offense_code).ok_or_else(|| {
            integrity(format!(
                "incident {} references unknown offense_code {}",
                record.incident_number, offense.offense_code
            ))
        })?;
        let location = locations.get(&offense.location_code).ok_or_else(|| {
            integrity(format!(
                "incident {} references unknown location_code {}",
                record.incident_number, offense.location_code
            ))
        })?;
        offenses.push(Offense {
            offense_type: offense_type.clone(),
            location: location.clone(),
        });
    }

    Ok(Incident {
        incident_number: record.incident_number,
        ori: record.ori,
        incident_date: record.incident_date,
        cleared: record.cleared,
        leoka_felony: record.leoka_felony,
        leoka_accident: record.leoka_accident,
        leoka_assault: record.leoka_assault,
        offenses,
    })
}

fn normalize_ori(ori: &str) -> String {
    ori.trim().to_ascii_uppercase()
}

fn integrity(message: String) -> DbError {
    DbError::Integrity { message }
}
