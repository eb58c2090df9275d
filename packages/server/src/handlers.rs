//! HTTP handler functions for the crime data API.

use actix_web::{HttpResponse, web};
use crime_data_query::QueryError;
use crime_data_query_models::{CountParams, IncidentListParams, ListParams};
use crime_data_server_models::{ApiError, ApiHealth};
use serde::Serialize;

use crate::AppState;

/// `GET /health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let version = env!("CARGO_PKG_VERSION").to_string();

    match state.store.snapshot().await {
        Ok(snapshot) => HttpResponse::Ok().json(ApiHealth {
            healthy: true,
            version,
            agency_count: snapshot.agency_count(),
            incident_count: snapshot.incident_count(),
        }),
        Err(e) => {
            log::error!("Health check failed: {e}");
            HttpResponse::ServiceUnavailable().json(ApiHealth {
                healthy: false,
                version,
                agency_count: 0,
                incident_count: 0,
            })
        }
    }
}

/// `GET /agencies/`
pub async fn agencies(
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> HttpResponse {
    let result =
        crime_data_query::list_agencies(state.store.as_ref(), &params, &state.query).await;
    respond("list agencies", result)
}

/// `GET /agencies/{ori}/`
pub async fn agency(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let result = crime_data_query::get_agency(state.store.as_ref(), &path).await;
    respond("get agency", result)
}

/// `GET /incidents/`
///
/// Lists incidents, optionally filtered by offense code, year, state or
/// agency.
pub async fn incidents(
    state: web::Data<AppState>,
    params: web::Query<IncidentListParams>,
) -> HttpResponse {
    let result =
        crime_data_query::list_incidents(state.store.as_ref(), &params, &state.query).await;
    respond("list incidents", result)
}

/// `GET /incidents/{incident_number}/`
pub async fn incident(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let result = crime_data_query::get_incident(state.store.as_ref(), &path).await;
    respond("get incident", result)
}

/// `GET /incidents/count/`
///
/// Counts incidents grouped by the `by` dimensions.
pub async fn incident_counts(
    state: web::Data<AppState>,
    params: web::Query<CountParams>,
) -> HttpResponse {
    let result =
        crime_data_query::count_incidents(state.store.as_ref(), &params, &state.query).await;
    respond("count incidents", result)
}

/// `GET /offense-types/`
pub async fn offense_types(
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> HttpResponse {
    let result =
        crime_data_query::list_offense_types(state.store.as_ref(), &params, &state.query).await;
    respond("list offense types", result)
}

fn respond<T: Serialize>(action: &str, result: Result<T, QueryError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(action, &e),
    }
}

/// Maps a query failure onto its status code and error body.
fn error_response(action: &str, e: &QueryError) -> HttpResponse {
    match e {
        QueryError::InvalidParameter { .. } => {
            log::warn!("Rejected request to {action}: {e}");
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        QueryError::NotFound { .. } => HttpResponse::NotFound().json(ApiError::new(e.to_string())),
        QueryError::Store(_) | QueryError::Serialization(_) => {
            log::error!("Failed to {action}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(format!("Failed to {action}")))
        }
    }
}
