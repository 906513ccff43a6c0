//! Shared fixtures for engine unit tests

use std::collections::BTreeSet;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use crate::core::error::StoreError;
use crate::core::identity::{AttributeName, AttributeValue, TemplateId, VariantId, VariantTriple};
use crate::store::{CatalogDocument, CatalogStore, SqliteStore};
use crate::yaml::parse_yaml;

pub const CATALOG: &str = r#"
attributes:
  - name: Size
    values: [XS, S, M, L]
  - name: Color
    values: [Green, Red, Blue]
  - name: Engraving
    values: [Silver, Gold]
templates:
  - code: SHIRT
    attributes: [Size, Color]
  - code: PEN
    attributes: [Size, Engraving]
variants:
  - code: SHIRT-S-RED
    variant_of: SHIRT
    attributes: { Size: S, Color: Red }
  - code: SHIRT-S-BLUE
    variant_of: SHIRT
    attributes: { Size: S, Color: Blue }
  - code: SHIRT-M-RED
    variant_of: SHIRT
    attributes: { Size: M, Color: Red }
  - code: PEN-M
    variant_of: PEN
    attributes: { Size: M }
  - code: PEN-M-GOLD
    variant_of: PEN
    attributes: { Size: M, Engraving: Gold }
"#;

/// Store holding the SHIRT and PEN templates
pub fn shirt_store() -> Arc<dyn CatalogStore> {
    store_from(CATALOG)
}

/// Store built from a YAML catalog document
pub fn store_from(yaml: &str) -> Arc<dyn CatalogStore> {
    sqlite_from(yaml)
}

/// Concrete SQLite store, for tests that change storage mid-way
pub fn sqlite_from(yaml: &str) -> Arc<SqliteStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    import(&store, yaml, "fixture.yaml");
    Arc::new(store)
}

/// Import `yaml` under `source`
pub fn import(store: &SqliteStore, yaml: &str, source: &str) {
    let doc: CatalogDocument = parse_yaml(yaml, source).unwrap();
    store.import_document(&doc, source).unwrap();
}

/// Store that can hold one assignment scan after it has read storage
///
/// Lets a test change storage while a snapshot build is in flight.
pub struct GatedStore {
    inner: Arc<SqliteStore>,
    gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

impl GatedStore {
    pub fn new(inner: Arc<SqliteStore>) -> Self {
        Self {
            inner,
            gate: Mutex::new(None),
        }
    }

    /// Arm the gate; returns (scan entered, release scan)
    pub fn arm(&self) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock() = Some((entered_tx, release_rx));
        (entered_rx, release_tx)
    }
}

impl CatalogStore for GatedStore {
    fn variant_attribute_assignments(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<VariantTriple>, StoreError> {
        let triples = self.inner.variant_attribute_assignments(template)?;
        let gate = self.gate.lock().take();
        if let Some((entered, release)) = gate {
            entered.send(()).unwrap();
            release.recv().unwrap();
        }
        Ok(triples)
    }

    fn attribute_definitions(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<(AttributeName, u32)>, StoreError> {
        self.inner.attribute_definitions(template)
    }

    fn global_attribute_values(
        &self,
        attribute: &AttributeName,
    ) -> Result<Vec<AttributeValue>, StoreError> {
        self.inner.global_attribute_values(attribute)
    }

    fn items_with_any_value(
        &self,
        attribute: &AttributeName,
        values: &[AttributeValue],
        template: Option<&TemplateId>,
    ) -> Result<BTreeSet<VariantId>, StoreError> {
        self.inner.items_with_any_value(attribute, values, template)
    }

    fn templates(&self) -> Result<Vec<TemplateId>, StoreError> {
        self.inner.templates()
    }
}

/// Store wrapper counting full variant scans, or failing every call
pub struct CountingStore {
    inner: Option<Arc<dyn CatalogStore>>,
    scans: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner: Some(inner),
            scans: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            inner: None,
            scans: AtomicUsize::new(0),
        }
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    fn inner(&self) -> Result<&Arc<dyn CatalogStore>, StoreError> {
        self.inner.as_ref().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "storage offline",
            ))
        })
    }
}

impl CatalogStore for CountingStore {
    fn variant_attribute_assignments(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<VariantTriple>, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner()?.variant_attribute_assignments(template)
    }

    fn attribute_definitions(
        &self,
        template: &TemplateId,
    ) -> Result<Vec<(AttributeName, u32)>, StoreError> {
        self.inner()?.attribute_definitions(template)
    }

    fn global_attribute_values(
        &self,
        attribute: &AttributeName,
    ) -> Result<Vec<AttributeValue>, StoreError> {
        self.inner()?.global_attribute_values(attribute)
    }

    fn items_with_any_value(
        &self,
        attribute: &AttributeName,
        values: &[AttributeValue],
        template: Option<&TemplateId>,
    ) -> Result<BTreeSet<VariantId>, StoreError> {
        self.inner()?.items_with_any_value(attribute, values, template)
    }

    fn templates(&self) -> Result<Vec<TemplateId>, StoreError> {
        self.inner()?.templates()
    }
}
