//! Catalog storage
//!
//! The variant engine only ever reads from storage through the
//! [`CatalogStore`] trait. [`SqliteStore`] is the bundled implementation,
//! filled from plain YAML catalog files.

pub mod document;
mod serialize;
pub mod sqlite;


use serde::Serialize;
use std::collections::BTreeSet;

use crate::core::error::StoreError;
use crate::core::identity::{AttributeName, AttributeValue, TemplateId, VariantId, VariantTriple};

pub use document::{AttributeValues, CatalogDocument, TemplateDoc, VariantDoc};
pub use sqlite::SqliteStore;

/// Read access to variant and attribute data
///
/// Each call is one scoped acquisition of the underlying storage; results
/// are consistent within a single call only.
pub trait CatalogStore: Send + Sync {
    /// All (variant, attribute, value) rows of the enabled variants of a
    /// template, ordered by variant then attribute position
    fn variant_attribute_assignments(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<VariantTriple>, StoreError>;

    /// Attributes declared on a template with their position, ordered by it
    fn attribute_definitions(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<(AttributeName, u32)>, StoreError>;

    /// The global ordered value list of an attribute
    fn global_attribute_values(
        &self,
        attribute: &AttributeName,
    ) -> Result<Vec<AttributeValue>, StoreError>;

    /// Items having any of `values` for `attribute`, optionally restricted to
    /// variants of `template`
    fn items_with_any_value(
        &self,
        attribute: &AttributeName,
        values: &[AttributeValue],
        template: Option<&TemplateId>,
    ) -> Result<BTreeSet<VariantId>, StoreError>;

    /// All templates, ordered by code
    fn templates(&self) -> Result<Vec<TemplateId>, StoreError>;
}

/// Outcome of syncing a catalog directory into the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub files_added: usize,
    pub files_updated: usize,
    pub files_removed: usize,
    pub files_unchanged: usize,
    /// Templates whose definitions or variants may have changed
    pub templates_touched: BTreeSet<TemplateId>,
}

impl SyncStats {
    /// True when nothing was imported or removed
    pub fn is_noop(&self) -> bool {
        self.files_added == 0 && self.files_updated == 0 && self.files_removed == 0
    }
}
