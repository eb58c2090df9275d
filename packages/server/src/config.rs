//! Environment-driven server configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crime_data_database::db;
use crime_data_query::QueryConfig;
use crime_data_query::paginate::DEFAULT_MAX_PAGE_SIZE;

/// Maximum page size override.
pub const MAX_PAGE_SIZE_ENV: &str = "CRIME_DATA_MAX_PAGE_SIZE";

/// Server settings read at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Snapshot document to serve (`CRIME_DATA_SNAPSHOT`).
    pub snapshot_path: PathBuf,
    /// Engine limits (`CRIME_DATA_MAX_PAGE_SIZE`).
    pub query: QueryConfig,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let snapshot_path = db::snapshot_path_from_env();
        Self::from_lookup(|key| std::env::var(key).ok(), snapshot_path)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, snapshot_path: PathBuf) -> Self {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or("PORT", lookup("PORT"), 8080);
        let max_page_size = parse_or(
            MAX_PAGE_SIZE_ENV,
            lookup(MAX_PAGE_SIZE_ENV),
            DEFAULT_MAX_PAGE_SIZE,
        );

        let max_page_size = if max_page_size == 0 {
            log::warn!("{MAX_PAGE_SIZE_ENV} must be positive, using {DEFAULT_MAX_PAGE_SIZE}");
            DEFAULT_MAX_PAGE_SIZE
        } else {
            max_page_size
        };

        Self {
            bind_addr,
            port,
            snapshot_path,
            query: QueryConfig { max_page_size },
        }
    }
}

fn parse_or<T: FromStr + std::fmt::Display + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        log::warn!("Ignoring invalid {key}='{raw}', using {default}");
        default
    })
}
