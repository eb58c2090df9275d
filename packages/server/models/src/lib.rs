#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Response envelopes for the crime data server.
//!
//! Record and aggregate rows come from `crime_data_query`; this crate only
//! holds the bodies the server produces itself.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the record store can serve a snapshot.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Agencies in the current snapshot.
    pub agency_count: usize,
    /// Incidents in the current snapshot.
    pub incident_count: usize,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable description.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
