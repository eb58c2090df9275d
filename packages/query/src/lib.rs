#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation and query-shaping engine for the crime data API.
//!
//! Each public pipeline corresponds to one endpoint. A pipeline validates
//! every request parameter, then takes a single snapshot from the
//! [`RecordStore`] and computes its rows from that immutable view.
//! Nothing is emitted unless the whole request succeeds.

pub mod aggregate;
pub mod dimensions;
pub mod fields;
pub mod filters;
pub mod paginate;
pub mod params;
pub mod projection;

use crime_data_database::{DbError, RecordStore};
use crime_data_query_models::views::{ApiAgency, ApiIncident, ApiOffenseType};
use crime_data_query_models::{CountParams, FilterParams, IncidentListParams, ListParams};
use thiserror::Error;

use crate::filters::IncidentFilter;
use crate::paginate::{DEFAULT_MAX_PAGE_SIZE, PageRequest};
use crate::projection::{Projection, View, assemble_aggregate, project};

pub use projection::Row;

/// Errors that can occur while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A request parameter is malformed or outside its vocabulary.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Query-string name of the offending parameter.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A keyed lookup found no record.
    #[error("{resource} '{key}' not found")]
    NotFound {
        /// Kind of record that was looked up.
        resource: &'static str,
        /// Key that was looked up.
        key: String,
    },

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    /// A view could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QueryError {
    /// Shorthand for [`QueryError::InvalidParameter`].
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

/// Engine limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Largest accepted `page_size`.
    pub max_page_size: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

fn page_request(
    page: Option<&str>,
    page_size: Option<&str>,
    config: &QueryConfig,
) -> Result<PageRequest, QueryError> {
    PageRequest::parse(page, page_size, config.max_page_size)
}

/// Lists agencies ordered by ORI.
///
/// # Errors
///
/// * [`QueryError::InvalidParameter`] if a page or `fields` value is invalid
/// * [`QueryError::Store`] if the store cannot produce a snapshot
pub async fn list_agencies(
    store: &dyn RecordStore,
    params: &ListParams,
    config: &QueryConfig,
) -> Result<Vec<Row>, QueryError> {
    let page = page_request(params.page.as_deref(), params.page_size.as_deref(), config)?;
    let projection = Projection::parse(params.fields.as_deref(), ApiAgency::KEY)?;

    let snapshot = store.snapshot().await?;

    page.slice(snapshot.agencies())
        .into_iter()
        .map(|agency| project(&ApiAgency::from(agency), &projection))
        .collect()
}

/// Looks up one agency by ORI (case-insensitive).
///
/// # Errors
///
/// * [`QueryError::NotFound`] if no agency has that ORI
/// * [`QueryError::Store`] if the store cannot produce a snapshot
pub async fn get_agency(store: &dyn RecordStore, ori: &str) -> Result<Row, QueryError> {
    let ori = ori.trim().to_ascii_uppercase();
    let snapshot = store.snapshot().await?;

    let agency = snapshot.agency(&ori).ok_or_else(|| QueryError::NotFound {
        resource: "Agency",
        key: ori.clone(),
    })?;

    project(&ApiAgency::from(agency), &Projection::default())
}

/// Lists incidents passing the filters, ordered by incident number.
///
/// Each incident embeds all of its offenses, not only the ones matching
/// `offense_code`.
///
/// # Errors
///
/// * [`QueryError::InvalidParameter`] if a filter, page, or `fields` value
///   is invalid
/// * [`QueryError::Store`] if the store cannot produce a snapshot
pub async fn list_incidents(
    store: &dyn RecordStore,
    params: &IncidentListParams,
    config: &QueryConfig,
) -> Result<Vec<Row>, QueryError> {
    let filter = IncidentFilter::compile(&FilterParams::from(params))?;
    let page = page_request(params.page.as_deref(), params.page_size.as_deref(), config)?;
    let projection = Projection::parse(params.fields.as_deref(), ApiIncident::KEY)?;

    let snapshot = store.snapshot().await?;

    let visible = snapshot.incidents().filter_map(|incident| {
        snapshot
            .agency(&incident.ori)
            .filter(|agency| filter.admits(incident, agency))
            .map(|agency| (incident, agency))
    });

    page.slice(visible)
        .into_iter()
        .map(|(incident, agency)| project(&ApiIncident::new(incident, agency), &projection))
        .collect()
}

/// Looks up one incident by its incident number.
///
/// # Errors
///
/// * [`QueryError::NotFound`] if no incident has that number
/// * [`QueryError::Store`] if the store cannot produce a snapshot
pub async fn get_incident(
    store: &dyn RecordStore,
    incident_number: &str,
) -> Result<Row, QueryError> {
    let incident_number = incident_number.trim();
    let snapshot = store.snapshot().await?;

    let not_found = || QueryError::NotFound {
        resource: "Incident",
        key: incident_number.to_string(),
    };

    let incident = snapshot.incident(incident_number).ok_or_else(not_found)?;
    let agency = snapshot.agency(&incident.ori).ok_or_else(not_found)?;

    project(&ApiIncident::new(incident, agency), &Projection::default())
}

/// Counts incidents or offenses grouped by the requested dimensions.
///
/// # Errors
///
/// * [`QueryError::InvalidParameter`] if `by`, `fields`, a filter, or a
///   page value is invalid
/// * [`QueryError::Store`] if the store cannot produce a snapshot
pub async fn count_incidents(
    store: &dyn RecordStore,
    params: &CountParams,
    config: &QueryConfig,
) -> Result<Vec<Row>, QueryError> {
    let dims = dimensions::resolve_dimensions(params.by.as_deref())?;
    let requested = fields::resolve_fields(params.fields.as_deref())?;
    let filter = IncidentFilter::compile(&FilterParams::from(params))?;
    let page = page_request(params.page.as_deref(), params.page_size.as_deref(), config)?;

    log::debug!("count_incidents: by={dims:?} fields={requested:?} filter={filter:?} page={page:?}");

    let snapshot = store.snapshot().await?;
    let rows = aggregate::aggregate(&snapshot, &filter, &dims);

    Ok(page
        .slice(rows.iter())
        .into_iter()
        .map(|row| assemble_aggregate(row, &requested))
        .collect())
}

/// Lists the offense type lookup table ordered by code.
///
/// # Errors
///
/// * [`QueryError::InvalidParameter`] if a page or `fields` value is invalid
/// * [`QueryError::Store`] if the store cannot produce a snapshot
pub async fn list_offense_types(
    store: &dyn RecordStore,
    params: &ListParams,
    config: &QueryConfig,
) -> Result<Vec<Row>, QueryError> {
    let page = page_request(params.page.as_deref(), params.page_size.as_deref(), config)?;
    let projection = Projection::parse(params.fields.as_deref(), ApiOffenseType::KEY)?;

    let snapshot = store.snapshot().await?;

    page.slice(snapshot.offense_types())
        .into_iter()
        .map(|offense_type| project(&ApiOffenseType::from(offense_type), &projection))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use crime_data_database::{MemoryStore, Snapshot, fixtures};
    use serde_json::Value;

    use super::*;

    /// Store that always fails and records how often it was asked.
    #[derive(Default)]
    struct FailingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn snapshot(&self) -> Result<Arc<Snapshot>, DbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DbError::Unavailable {
                message: "offline".to_string(),
            })
        }
    }

    fn count_params(by: Option<&str>) -> CountParams {
        CountParams {
            by: by.map(ToString::to_string),
            page_size: Some("1000".to_string()),
            ..CountParams::default()
        }
    }

    fn int(row: &Row, column: &str) -> i64 {
        row[column].as_i64().unwrap()
    }

    fn text(row: &Row, column: &str) -> String {
        row[column].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn default_grouping_is_by_year_with_unique_years() {
        let store = fixtures::sample_store();
        let rows = count_incidents(&store, &count_params(None), &QueryConfig::default())
            .await
            .unwrap();

        let years: Vec<i64> = rows.iter().map(|r| int(r, "year")).collect();
        assert_eq!(years, vec![2013, 2014, 2015]);

        let names: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(names, vec!["year", "total_actual_count"]);

        let total: i64 = rows.iter().map(|r| int(r, "total_actual_count")).sum();
        assert_eq!(total, i64::try_from(fixtures::INCIDENT_COUNT).unwrap());
    }

    #[tokio::test]
    async fn agency_year_pairs_collapse_into_agency_totals() {
        let store = fixtures::sample_store();
        let config = QueryConfig::default();

        let pairs = count_incidents(&store, &count_params(Some("agency_id,year")), &config)
            .await
            .unwrap();
        let unique: BTreeSet<(i64, i64)> = pairs
            .iter()
            .map(|r| (int(r, "agency_id"), int(r, "year")))
            .collect();
        assert_eq!(unique.len(), pairs.len());

        let mut summed: BTreeMap<i64, i64> = BTreeMap::new();
        for row in &pairs {
            *summed.entry(int(row, "agency_id")).or_default() += int(row, "total_actual_count");
        }

        let by_agency = count_incidents(&store, &count_params(Some("agency_id")), &config)
            .await
            .unwrap();
        let totals: BTreeMap<i64, i64> = by_agency
            .iter()
            .map(|r| (int(r, "agency_id"), int(r, "total_actual_count")))
            .collect();
        assert_eq!(totals.len(), by_agency.len());
        assert_eq!(totals, summed);
    }

    #[tokio::test]
    async fn requested_fields_follow_the_total() {
        let store = fixtures::sample_store();
        let params = CountParams {
            by: Some("state".to_string()),
            fields: Some("leoka_felony,leoka_assault".to_string()),
            ..CountParams::default()
        };
        let rows = count_incidents(&store, &params, &QueryConfig::default())
            .await
            .unwrap();

        assert!(!rows.is_empty());
        for row in &rows {
            let names: Vec<&str> = row.keys().map(String::as_str).collect();
            assert_eq!(
                names,
                vec!["state", "total_actual_count", "leoka_felony", "leoka_assault"]
            );
        }

        let total: i64 = rows.iter().map(|r| int(r, "total_actual_count")).sum();
        assert_eq!(total, i64::try_from(fixtures::INCIDENT_COUNT).unwrap());

        let states: Vec<String> = rows.iter().map(|r| text(r, "state")).collect();
        let mut sorted = states.clone();
        sorted.sort();
        assert_eq!(states, sorted);
    }

    #[tokio::test]
    async fn count_pages_are_disjoint_slices_of_the_full_result() {
        let store = fixtures::sample_store();
        let config = QueryConfig::default();
        let page = |n: &str| CountParams {
            by: Some("agency_id,year".to_string()),
            page: Some(n.to_string()),
            page_size: Some("5".to_string()),
            ..CountParams::default()
        };

        let full = count_incidents(&store, &count_params(Some("agency_id,year")), &config)
            .await
            .unwrap();
        let first = count_incidents(&store, &page("1"), &config).await.unwrap();
        let second = count_incidents(&store, &page("2"), &config).await.unwrap();
        let again = count_incidents(&store, &page("2"), &config).await.unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(second, again);
        let joined: Vec<Row> = first.into_iter().chain(second).collect();
        assert_eq!(joined, full[..10].to_vec());
    }

    #[tokio::test]
    async fn agency_pages_do_not_overlap() {
        let store = fixtures::sample_store();
        let config = QueryConfig::default();
        let page = |n: &str| ListParams {
            page: Some(n.to_string()),
            page_size: Some("10".to_string()),
            fields: None,
        };

        let first = list_agencies(&store, &page("1"), &config).await.unwrap();
        let second = list_agencies(&store, &page("2"), &config).await.unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        let first_oris: BTreeSet<String> = first.iter().map(|r| text(r, "ori")).collect();
        assert!(second.iter().all(|r| !first_oris.contains(&text(r, "ori"))));

        let oris: Vec<String> = first.iter().chain(&second).map(|r| text(r, "ori")).collect();
        let mut sorted = oris.clone();
        sorted.sort();
        assert_eq!(oris, sorted);
    }

    #[tokio::test]
    async fn agency_listing_honours_projection() {
        let store = fixtures::sample_store();
        let params = ListParams {
            page_size: Some("5".to_string()),
            fields: Some("name".to_string()),
            ..ListParams::default()
        };
        let rows = list_agencies(&store, &params, &QueryConfig::default())
            .await
            .unwrap();

        assert_eq!(rows.len(), 5);
        for row in rows {
            let names: Vec<&str> = row.keys().map(String::as_str).collect();
            assert_eq!(names, vec!["ori", "name"]);
        }
    }

    #[tokio::test]
    async fn incident_pages_do_not_overlap() {
        let store = fixtures::sample_store();
        let config = QueryConfig::default();
        let page = |n: &str| IncidentListParams {
            page: Some(n.to_string()),
            ..IncidentListParams::default()
        };

        let first = list_incidents(&store, &page("1"), &config).await.unwrap();
        let second = list_incidents(&store, &page("2"), &config).await.unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        let numbers: BTreeSet<String> =
            first.iter().map(|r| text(r, "incident_number")).collect();
        assert!(
            second
                .iter()
                .all(|r| !numbers.contains(&text(r, "incident_number")))
        );
        assert_eq!(second[0]["incident_number"], "INC-00010");
    }

    #[tokio::test]
    async fn lower_case_ori_round_trips_from_listing_to_lookup() {
        let mut doc = fixtures::sample_document();
        let ori = doc.agencies[0].ori.clone();
        doc.agencies[0].ori = ori.to_ascii_lowercase();
        for incident in doc.incidents.iter_mut().filter(|i| i.ori == ori) {
            incident.ori = ori.to_ascii_lowercase();
        }
        let store = MemoryStore::new(Snapshot::from_document(doc).unwrap());

        let params = ListParams {
            page_size: Some("100".to_string()),
            ..ListParams::default()
        };
        let listed = list_agencies(&store, &params, &QueryConfig::default())
            .await
            .unwrap();
        assert!(listed.iter().any(|r| text(r, "ori") == ori));

        let agency = get_agency(&store, &ori).await.unwrap();
        assert_eq!(text(&agency, "ori"), ori);
        let agency = get_agency(&store, &ori.to_ascii_lowercase()).await.unwrap();
        assert_eq!(text(&agency, "ori"), ori);
    }

    #[tokio::test]
    async fn offense_code_filter_returns_only_matching_incidents() {
        let store = fixtures::sample_store();
        let params = IncidentListParams {
            offense_code: Some("35A".to_string()),
            page_size: Some("1000".to_string()),
            ..IncidentListParams::default()
        };
        let rows = list_incidents(&store, &params, &QueryConfig::default())
            .await
            .unwrap();

        assert!(!rows.is_empty());
        for row in &rows {
            let offenses = row["offenses"].as_array().unwrap();
            assert!(
                offenses
                    .iter()
                    .any(|o| o["offense_type"]["offense_code"] == "35A"),
                "{}",
                row["incident_number"]
            );
        }
    }

    #[tokio::test]
    async fn page_size_five_yields_five_incidents() {
        let store = fixtures::sample_store();
        let params = IncidentListParams {
            page_size: Some("5".to_string()),
            ..IncidentListParams::default()
        };
        let rows = list_incidents(&store, &params, &QueryConfig::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["incident_number"], "INC-00000");
    }

    #[tokio::test]
    async fn lookups_find_records_or_report_not_found() {
        let store = fixtures::sample_store();

        let incident = get_incident(&store, "INC-00003").await.unwrap();
        assert_eq!(incident["incident_number"], "INC-00003");
        assert!(matches!(incident["agency"], Value::Object(_)));

        let ori = incident["agency"]["ori"].as_str().unwrap().to_string();
        let agency = get_agency(&store, &ori.to_ascii_lowercase()).await.unwrap();
        assert_eq!(text(&agency, "ori"), ori);

        assert!(matches!(
            get_agency(&store, "ZZ0000000").await,
            Err(QueryError::NotFound { resource: "Agency", .. })
        ));
        assert!(matches!(
            get_incident(&store, "INC-99999").await,
            Err(QueryError::NotFound { resource: "Incident", .. })
        ));
    }

    #[tokio::test]
    async fn offense_types_are_ordered_by_code() {
        let store = fixtures::sample_store();
        let rows = list_offense_types(&store, &ListParams::default(), &QueryConfig::default())
            .await
            .unwrap();
        let codes: Vec<String> = rows.iter().map(|r| text(r, "offense_code")).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
        assert!(codes.contains(&"35A".to_string()));
    }

    #[tokio::test]
    async fn invalid_parameters_fail_before_touching_the_store() {
        let store = FailingStore::default();
        let config = QueryConfig::default();

        let err = count_incidents(&store, &count_params(Some("bogus")), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidParameter { name: "by", .. }));

        let params = IncidentListParams {
            year: Some("nineteen".to_string()),
            ..IncidentListParams::default()
        };
        assert!(list_incidents(&store, &params, &config).await.is_err());

        let params = ListParams {
            page_size: Some("1001".to_string()),
            ..ListParams::default()
        };
        assert!(list_agencies(&store, &params, &config).await.is_err());

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_without_rows() {
        let store = FailingStore::default();
        let err = count_incidents(&store, &count_params(None), &QueryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Store(DbError::Unavailable { .. })));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn configured_maximum_bounds_page_size() {
        let store = fixtures::sample_store();
        let config = QueryConfig { max_page_size: 20 };
        let params = ListParams {
            page_size: Some("21".to_string()),
            ..ListParams::default()
        };
        let err = list_agencies(&store, &params, &config).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidParameter { name: "page_size", .. }
        ));
    }
}
