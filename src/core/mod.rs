//! Core module - fundamental types and utilities

pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod project;

pub use config::Config;
pub use error::{CatalogError, CatalogResult, StoreError};
pub use identity::{AttributeDefinition, AttributeName, AttributeValue, TemplateId, VariantId, VariantTriple};
pub use project::{Project, ProjectError};
