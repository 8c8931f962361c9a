//! Error types for loading item tables and planner configuration.
//!
//! Planning itself never fails: missing data yields empty branches and an
//! unobtainable target yields a childless root. Only I/O and parsing at the
//! edges of the crate produce errors.

use thiserror::Error;

/// Errors raised while loading the item tables.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed row in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid {field} in {file}: {value:?}")]
    InvalidField {
        file: String,
        field: &'static str,
        value: String,
    },
}

/// Errors raised while loading a [`PlannerConfig`](crate::config::PlannerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
