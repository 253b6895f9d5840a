//! Error types for lane lookups, pooling and settings
//!
//! None of these end a run. Callers log them and carry on.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::pool::EntityId;

/// Lane lookup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LaneError {
    /// Index outside `0..count`
    #[error("lane {index} is out of range (lane count {count})")]
    OutOfRange { index: i64, count: usize },
}

/// Pool misuse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Entity was already sitting in its queue
    #[error("entity {0:?} is already pooled")]
    AlreadyPooled(EntityId),
    /// Handle does not belong to this pool
    #[error("entity {0:?} does not belong to this pool")]
    UnknownEntity(EntityId),
}

/// Settings import/export failures
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A field was outside its domain and has been replaced
    #[error("invalid {field}: {value} (reset to {replacement})")]
    InvalidValue {
        field: &'static str,
        value: String,
        replacement: String,
    },

    /// Persisted data could not be parsed
    #[error("malformed settings file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the settings file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
