//! Error types for dataset loading and cache persistence.
//!
//! Extraction failures and exhausted cascades are not errors: they are
//! reported as [`crate::matching::AlertOutcome`] variants.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// No dataset file present in the dataset directory.
    #[error("no dataset file found in {}", dir.display())]
    DatasetUnavailable { dir: PathBuf },

    /// The dataset file could not be parsed or lacks the expected structure.
    #[error("malformed dataset {}: {reason}", path.display())]
    DatasetMalformed { path: PathBuf, reason: String },

    /// Writing an equivalence cache file failed. The in-memory entry is kept.
    #[error("failed to persist equivalence cache {}: {source}", path.display())]
    CachePersistFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DatasetMalformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
