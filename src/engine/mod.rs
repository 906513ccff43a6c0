//! Variant attribute resolution
//!
//! - [`index`]: cached per-template snapshots of variant assignments
//! - [`catalog`]: ordered attributes and their selectable values
//! - [`narrowing`]: reachable values and exact-match detection for a selection
//! - [`query`]: item lookup by multi-attribute filters

pub mod catalog;
pub mod index;
pub mod narrowing;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{AttributeCatalog, AttributeOptions};
pub use index::{Assignment, VariantIndex, VariantSnapshot};
pub use narrowing::{Narrowing, NarrowingEngine, Selection, FILTERED_ITEMS_LIMIT};
pub use query::{AttributeFilters, FilterValues, MultiAttributeQuery};
