//! varsel: configurable-product variant selection
//!
//! Resolves a template item (a product with configurable attributes) plus a
//! partial attribute selection to the concrete stocked variant, and reports
//! which values remain reachable along the way. Catalog data lives in YAML
//! files that are synced into a SQLite database.

pub mod api;
pub mod cli;
pub mod core;
pub mod engine;
pub mod store;
pub mod yaml;
