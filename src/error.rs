//! Error types for bind-zonegen.

use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordError;

/// Errors that can occur while generating zone files.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A required input file (zone list or zone query file) does not exist.
    #[error("Missing input file: {}", .path.display())]
    MissingInput {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// IO error while reading or writing a file.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A `Name=` header line that does not carry exactly `Name`, `Records` and `Children`.
    #[error("Malformed header on line {line}: {reason}")]
    MalformedHeader {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the header.
        reason: String,
    },

    /// A record line that failed to parse or validate.
    #[error("Malformed record on line {line}: {source}")]
    MalformedRecord {
        /// 1-based line number.
        line: usize,
        /// Record-level error.
        #[source]
        source: RecordError,
    },

    /// A node name declared twice while duplicates are rejected.
    #[error("Duplicate node '{name}' on line {line}")]
    DuplicateNode {
        /// Node name.
        name: String,
        /// 1-based line number of the second header.
        line: usize,
    },

    /// The zone's root node has no SOA record.
    #[error("Zone '{zone}' has no SOA record in its root node")]
    MissingSoa {
        /// Zone name.
        zone: String,
    },

    /// JSON snapshot serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    /// One or more zones could not be generated.
    #[error("{count} zone(s) failed to generate")]
    ZonesFailed {
        /// Number of failed zones.
        count: usize,
    },
}

impl GeneratorError {
    /// Wrap an IO error with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only affects the zone being processed.
    ///
    /// Zone-scoped errors skip the zone; every other error aborts the run.
    pub fn is_zone_scoped(&self) -> bool {
        matches!(
            self,
            Self::MalformedHeader { .. }
                | Self::MalformedRecord { .. }
                | Self::DuplicateNode { .. }
                | Self::MissingSoa { .. }
        )
    }
}
