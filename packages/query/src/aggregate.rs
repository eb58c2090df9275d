//! Grouped counting over a snapshot.
//!
//! The unit being counted (the "fact") depends on the grouping: when any
//! requested dimension is offense-scoped each matching offense is a fact,
//! otherwise each visible incident is a fact. Groups live in a `BTreeMap`
//! keyed by the tuple of key values, which collapses duplicates and yields
//! rows in ascending key order.

use std::collections::{BTreeMap, BTreeSet};

use crime_data_crime_models::{Agency, Incident, Offense};
use crime_data_database::Snapshot;
use crime_data_query_models::{Accumulation, AggregateRow, Dimension, FieldName, GroupValue, Scope};

use crate::dimensions::extract;
use crate::fields;
use crate::filters::IncidentFilter;

/// One countable unit.
#[derive(Debug, Clone, Copy)]
pub struct Fact<'a> {
    /// Incident the fact belongs to.
    pub incident: &'a Incident,
    /// Owning agency of the incident.
    pub agency: &'a Agency,
    /// The contributing offense at offense grain, `None` at incident grain.
    pub offense: Option<&'a Offense>,
    /// Number of matching offenses the fact stands for.
    pub matched_offenses: u64,
}

#[derive(Debug, Default)]
struct Accumulator<'a> {
    measures: BTreeMap<FieldName, u64>,
    incidents: BTreeSet<&'a str>,
}

impl<'a> Accumulator<'a> {
    fn add(&mut self, fact: &Fact<'a>) {
        let first_for_incident = self.incidents.insert(fact.incident.incident_number.as_str());
        for &field in FieldName::all() {
            let counted = match field.accumulation() {
                Accumulation::PerFact => true,
                Accumulation::PerIncident => first_for_incident,
            };
            let value = self.measures.entry(field).or_insert(0);
            if counted {
                *value += fields::measure(field, fact);
            }
        }
    }
}

/// Counts the facts of `snapshot` that pass `filter`, grouped by
/// `dimensions`.
///
/// Only observed key combinations produce a row. Rows are returned in
/// ascending order of their key tuple, and every row carries a value for
/// every field in the registry.
#[must_use]
pub fn aggregate(
    snapshot: &Snapshot,
    filter: &IncidentFilter,
    dimensions: &[Dimension],
) -> Vec<AggregateRow> {
    let offense_grain = dimensions.iter().any(|d| d.scope() == Scope::Offense);
    let mut groups: BTreeMap<Vec<GroupValue>, Accumulator<'_>> = BTreeMap::new();

    for_each_fact(snapshot, filter, offense_grain, |fact| {
        let key: Option<Vec<GroupValue>> = dimensions
            .iter()
            .map(|&dimension| extract(dimension, &fact))
            .collect();
        if let Some(key) = key {
            groups.entry(key).or_default().add(&fact);
        }
    });

    log::debug!(
        "Aggregated {} group(s) over {:?} ({} grain)",
        groups.len(),
        dimensions,
        if offense_grain { "offense" } else { "incident" },
    );

    groups
        .into_iter()
        .map(|(values, acc)| AggregateRow {
            keys: dimensions.iter().copied().zip(values).collect(),
            measures: acc.measures,
        })
        .collect()
}

fn for_each_fact<'a>(
    snapshot: &'a Snapshot,
    filter: &IncidentFilter,
    offense_grain: bool,
    mut visit: impl FnMut(Fact<'a>),
) {
    for incident in snapshot.incidents() {
        let Some(agency) = snapshot.agency(&incident.ori) else {
            log::warn!(
                "Incident {} references missing agency {}, skipping",
                incident.incident_number,
                incident.ori
            );
            continue;
        };
        if !filter.matches_incident(incident, agency) {
            continue;
        }

        let matching: Vec<&Offense> = filter.matching_offenses(incident).collect();
        if filter.constrains_offenses() && matching.is_empty() {
            continue;
        }

        if offense_grain {
            for offense in matching {
                visit(Fact {
                    incident,
                    agency,
                    offense: Some(offense),
                    matched_offenses: 1,
                });
            }
        } else {
            visit(Fact {
                incident,
                agency,
                offense: None,
                matched_offenses: matching.len() as u64,
            });
        }
    }
}
