//! Error types for the variant engine and its storage collaborator

use thiserror::Error;

use crate::core::identity::TemplateId;
use crate::yaml::YamlError;

/// Errors surfaced by the variant engine to its callers
///
/// Cloneable so that a single failed snapshot build can be reported to every
/// reader that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown template: {template} has no variant attributes")]
    UnknownTemplate { template: TemplateId },

    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },
}

impl CatalogError {
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        CatalogError::InvalidFilter {
            message: message.into(),
        }
    }

    /// Short machine-readable name used in RPC error envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::UnknownTemplate { .. } => "unknown_template",
            CatalogError::InvalidFilter { .. } => "invalid_filter",
            CatalogError::StorageUnavailable { .. } => "storage_unavailable",
        }
    }
}

/// Errors raised by the catalog store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk catalog directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("Catalog file {file}: {message}")]
    InvalidCatalog { file: String, message: String },
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::StorageUnavailable {
            message: err.to_string(),
        }
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
