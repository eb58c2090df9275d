#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime data API.
//!
//! Serves agency and incident listings, keyed lookups, and grouped
//! incident counts from an in-memory snapshot loaded at startup.
//! Routes answer with and without a trailing slash.

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{self, TrailingSlash};
use actix_web::{App, HttpResponse, HttpServer, error, web};
use crime_data_database::{MemoryStore, RecordStore};
use crime_data_query::QueryConfig;
use crime_data_server_models::ApiError;

pub use config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Source of read-only snapshots.
    pub store: Arc<dyn RecordStore>,
    /// Engine limits.
    pub query: QueryConfig,
}

/// Registers every route of the API.
///
/// Paths are declared without a trailing slash; wrap the app in
/// [`middleware::NormalizePath`] with [`TrailingSlash::Trim`] so that the
/// slashed forms resolve too.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_extractor_config())
        .route("/health", web::get().to(handlers::health))
        .route("/agencies", web::get().to(handlers::agencies))
        .route("/agencies/{ori}", web::get().to(handlers::agency))
        .route("/incidents", web::get().to(handlers::incidents))
        .route("/incidents/count", web::get().to(handlers::incident_counts))
        .route("/incidents/{incident_number}", web::get().to(handlers::incident))
        .route("/offense-types", web::get().to(handlers::offense_types));
}

/// Query-string decoding failures use the same JSON error body as
/// everything else.
fn query_extractor_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected query string: {err}");
        let body = ApiError::new(format!("Invalid query string: {err}"));
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Starts the crime data API server.
///
/// Loads the snapshot named by the environment, then serves it until the
/// server is stopped. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the snapshot cannot be loaded, or
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Loading snapshot from {}...", config.snapshot_path.display());
    let store = MemoryStore::open(&config.snapshot_path).map_err(|e| {
        log::error!("Failed to load snapshot: {e}");
        std::io::Error::other(e)
    })?;

    let state = web::Data::new(AppState {
        store: Arc::new(store),
        query: config.query,
    });

    log::info!(
        "Starting server on {}:{} (max page size {})",
        config.bind_addr,
        config.port,
        config.query.max_page_size
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::NormalizePath::new(TrailingSlash::Trim))
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use actix_web::http::StatusCode;
    use actix_web::{dev::ServiceResponse, test};
    use async_trait::async_trait;
    use crime_data_database::{DbError, Snapshot, fixtures};
    use serde_json::Value;

    use super::*;

    struct OfflineStore;

    #[async_trait]
    impl RecordStore for OfflineStore {
        async fn snapshot(&self) -> Result<Arc<Snapshot>, DbError> {
            Err(DbError::Unavailable {
                message: "offline".to_string(),
            })
        }
    }

    async fn call(store: Arc<dyn RecordStore>, uri: &str) -> ServiceResponse {
        let state = web::Data::new(AppState {
            store,
            query: QueryConfig::default(),
        });
        let app = test::init_service(
            App::new()
                .wrap(middleware::NormalizePath::new(TrailingSlash::Trim))
                .app_data(state)
                .configure(routes),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let resp = call(Arc::new(fixtures::sample_store()), uri).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn agency_pages_do_not_overlap() {
        let (status, first) = get("/agencies/?page=1&page_size=10").await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = get("/agencies/?page=2&page_size=10").await;

        let first: BTreeSet<String> = first
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["ori"].as_str().unwrap().to_string())
            .collect();
        let second = second.as_array().unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        assert!(
            second
                .iter()
                .all(|a| !first.contains(a["ori"].as_str().unwrap()))
        );
    }

    #[actix_web::test]
    async fn incident_pages_do_not_overlap() {
        let (status, first) = get("/incidents/?page=1").await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = get("/incidents/?page=2").await;

        let first: BTreeSet<String> = first
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["incident_number"].as_str().unwrap().to_string())
            .collect();
        let second = second.as_array().unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        assert!(
            second
                .iter()
                .all(|i| !first.contains(i["incident_number"].as_str().unwrap()))
        );
    }

    #[actix_web::test]
    async fn state_counts_have_one_row_per_state() {
        let (status, body) = get("/incidents/count/?by=state&page_size=100").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        let states: BTreeSet<&str> = rows.iter().map(|r| r["state"].as_str().unwrap()).collect();
        assert!(!rows.is_empty());
        assert_eq!(states.len(), rows.len());

        let total: i64 = rows
            .iter()
            .map(|r| r["total_actual_count"].as_i64().unwrap())
            .sum();
        assert_eq!(total, i64::try_from(fixtures::INCIDENT_COUNT).unwrap());
    }

    #[actix_web::test]
    async fn bare_and_slashed_paths_agree() {
        let (_, slashed) = get("/incidents/count/?by=state").await;
        let (_, bare) = get("/incidents/count?by=state").await;
        assert_eq!(slashed, bare);
    }

    #[actix_web::test]
    async fn count_route_is_not_taken_for_an_incident_number() {
        let (status, body) = get("/incidents/count/").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.get("year").is_some()));
    }

    #[actix_web::test]
    async fn agency_year_counts_are_unique_pairs() {
        let (status, body) = get("/incidents/count/?by=agency_id,year&page_size=100").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        let pairs: BTreeSet<(i64, i64)> = rows
            .iter()
            .map(|r| (r["agency_id"].as_i64().unwrap(), r["year"].as_i64().unwrap()))
            .collect();
        assert_eq!(pairs.len(), rows.len());
    }

    #[actix_web::test]
    async fn offense_code_filter_applies_to_listing() {
        let (status, body) = get("/incidents/?offense_code=35A&page_size=5").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 5);
        for row in rows {
            assert!(
                row["offenses"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .any(|o| o["offense_type"]["offense_code"] == "35A")
            );
        }
    }

    #[actix_web::test]
    async fn unknown_dimension_is_bad_request() {
        let (status, body) = get("/incidents/count/?by=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("bogus"));
        assert!(body.as_array().is_none());
    }

    #[actix_web::test]
    async fn lookups_return_record_or_not_found() {
        let (status, body) = get("/incidents/INC-00002/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["incident_number"], "INC-00002");

        let ori = body["agency"]["ori"].as_str().unwrap().to_string();
        let (status, body) = get(&format!("/agencies/{ori}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ori"], ori.as_str());

        let (status, body) = get("/incidents/INC-99999/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn offense_types_are_listed() {
        let (status, body) = get("/offense-types/?fields=offense_name").await;
        assert_eq!(status, StatusCode::OK);
        let first = body.as_array().unwrap().first().unwrap().as_object().unwrap();
        let names: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["offense_code", "offense_name"]);
    }

    #[actix_web::test]
    async fn health_reports_snapshot_size() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["agencyCount"], fixtures::AGENCY_COUNT);
    }

    #[actix_web::test]
    async fn store_failure_is_internal_error() {
        let resp = call(Arc::new(OfflineStore), "/incidents/count/").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to count incidents");

        let resp = call(Arc::new(OfflineStore), "/health").await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
