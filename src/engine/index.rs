//! Per-template variant index
//!
//! A [`VariantSnapshot`] is the immutable, denormalized view of one
//! template's variants: the raw (variant, attribute, value) triples plus two
//! lookup maps derived from them. [`VariantIndex`] owns a keyed cache of
//! snapshots; a rebuild always produces a fresh snapshot that replaces the
//! cached one whole, so readers holding an `Arc` never see a partial build.

use moka::sync::Cache;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::CacheConfig;
use crate::core::error::CatalogResult;
use crate::core::identity::{
    AttributeDefinition, AttributeName, AttributeValue, TemplateId, VariantId, VariantTriple,
};
use crate::store::CatalogStore;

/// Attribute assignment of one variant
pub type Assignment = BTreeMap<AttributeName, AttributeValue>;

/// Immutable point-in-time index of a template's variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSnapshot {
    template: TemplateId,
    /// Index clock value when the storage scan started
    generation: u64,
    definitions: Vec<(AttributeName, u32)>,
    optional: BTreeSet<AttributeName>,
    triples: Vec<VariantTriple>,
    by_attribute_value: BTreeMap<AttributeName, BTreeMap<AttributeValue, BTreeSet<VariantId>>>,
    by_variant: BTreeMap<VariantId, Assignment>,
}

impl VariantSnapshot {
    /// Derive all views from one scan of storage
    pub fn build(
        template: TemplateId,
        mut definitions: Vec<(AttributeName, u32)>,
        mut triples: Vec<VariantTriple>,
    ) -> Self {
        definitions.sort_by_key(|(_, idx)| *idx);

        let before = triples.len();
        triples.retain(|t| definitions.iter().any(|(a, _)| *a == t.attribute));
        let undeclared = before - triples.len();
        if undeclared > 0 {
            tracing::warn!(
                template = %template,
                rows = undeclared,
                "variant rows use attributes the template does not declare; they are ignored"
            );
        }

        let mut by_attribute_value: BTreeMap<_, BTreeMap<_, BTreeSet<_>>> = BTreeMap::new();
        let mut by_variant: BTreeMap<VariantId, Assignment> = BTreeMap::new();
        for triple in &triples {
            by_attribute_value
                .entry(triple.attribute.clone())
                .or_default()
                .entry(triple.value.clone())
                .or_default()
                .insert(triple.variant.clone());
            by_variant
                .entry(triple.variant.clone())
                .or_default()
                .insert(triple.attribute.clone(), triple.value.clone());
        }

        let optional = definitions
            .iter()
            .filter(|(attribute, _)| {
                by_variant
                    .values()
                    .any(|assignment| !assignment.contains_key(attribute))
            })
            .map(|(attribute, _)| attribute.clone())
            .collect();

        Self {
            template,
            generation: 0,
            definitions,
            optional,
            triples,
            by_attribute_value,
            by_variant,
        }
    }

    pub fn template(&self) -> &TemplateId {
        &self.template
    }

    /// Declared attributes in display order, with their optional flag
    pub fn attribute_definitions(&self) -> Vec<AttributeDefinition> {
        self.definitions
            .iter()
            .map(|(attribute, idx)| AttributeDefinition {
                attribute: attribute.clone(),
                idx: *idx,
                optional: self.optional.contains(attribute),
            })
            .collect()
    }

    /// Attributes that at least one variant omits
    pub fn optional_attributes(&self) -> &BTreeSet<AttributeName> {
        &self.optional
    }

    /// All (variant, attribute, value) rows in storage order
    pub fn triples(&self) -> &[VariantTriple] {
        &self.triples
    }

    /// Variants assigned `value` for `attribute`
    pub fn variants_with(&self, attribute: &str, value: &str) -> Option<&BTreeSet<VariantId>> {
        self.by_attribute_value.get(attribute)?.get(value)
    }

    /// Whether any variant carries `value` for `attribute`
    pub fn has_value(&self, attribute: &str, value: &str) -> bool {
        self.variants_with(attribute, value)
            .is_some_and(|variants| !variants.is_empty())
    }

    /// The attribute assignment of a variant
    pub fn assignment(&self, variant: &str) -> Option<&Assignment> {
        self.by_variant.get(variant)
    }

    /// All variants with their assignments, ordered by variant id
    pub fn variants(&self) -> impl Iterator<Item = (&VariantId, &Assignment)> {
        self.by_variant.iter()
    }

    pub fn variant_count(&self) -> usize {
        self.by_variant.len()
    }

    /// Whether both snapshots hold the same data, ignoring build generation
    pub fn same_content(&self, other: &VariantSnapshot) -> bool {
        self.template == other.template
            && self.definitions == other.definitions
            && self.optional == other.optional
            && self.triples == other.triples
            && self.by_attribute_value == other.by_attribute_value
            && self.by_variant == other.by_variant
    }
}

/// Keyed cache of variant snapshots, one per template
///
/// Snapshots are built lazily from the store on first use and held until
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear). Concurrent
/// misses for the same template share one build.
pub struct VariantIndex {
    store: Arc<dyn CatalogStore>,
    cache: Cache<TemplateId, Arc<VariantSnapshot>>,
    clock: AtomicU64,
    invalidated_at: Mutex<HashMap<TemplateId, u64>>,
    cleared_at: AtomicU64,
}

/// Rebuild attempts before accepting a snapshot raced by invalidations
const MAX_STALE_RETRIES: usize = 3;

impl VariantIndex {
    pub fn new(store: Arc<dyn CatalogStore>, config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_templates.max(1));
        if let Some(secs) = config.time_to_live_secs {
            builder = builder.time_to_live(Duration::from_secs(secs));
        }
        Self {
            store,
            cache: builder.build(),
            clock: AtomicU64::new(0),
            invalidated_at: Mutex::new(HashMap::new()),
            cleared_at: AtomicU64::new(0),
        }
    }

    /// The snapshot for `template`, building it on a miss
    ///
    /// An unknown template yields an empty snapshot, not an error.
    pub fn snapshot(&self, template: &TemplateId) -> CatalogResult<Arc<VariantSnapshot>> {
        let mut attempts = 0;
        loop {
            let snapshot = self
                .cache
                .try_get_with(template.clone(), || self.build(template).map(Arc::new))
                .map_err(|e| (*e).clone())?;

            // A build that started before the latest invalidation may have
            // read data the invalidation was meant to discard.
            attempts += 1;
            if snapshot.generation >= self.last_invalidation(template)
                || attempts > MAX_STALE_RETRIES
            {
                return Ok(snapshot);
            }
            tracing::debug!(template = %template, "discarding snapshot raced by invalidation");
            self.cache.invalidate(template);
        }
    }

    fn build(&self, template: &TemplateId) -> CatalogResult<VariantSnapshot> {
        let generation = self.clock.load(Ordering::SeqCst);
        let definitions = self.store.attribute_definitions(template)?;
        let triples = self.store.variant_attribute_assignments(template)?;

        let mut snapshot = VariantSnapshot::build(template.clone(), definitions, triples);
        snapshot.generation = generation;

        tracing::debug!(
            template = %template,
            attributes = snapshot.definitions.len(),
            variants = snapshot.variant_count(),
            triples = snapshot.triples.len(),
            "built variant snapshot"
        );
        Ok(snapshot)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn last_invalidation(&self, template: &TemplateId) -> u64 {
        let invalidated = self
            .invalidated_at
            .lock()
            .get(template)
            .copied()
            .unwrap_or(0);
        invalidated.max(self.cleared_at.load(Ordering::SeqCst))
    }

    /// Drop the cached snapshot of `template`; the next read rebuilds it
    pub fn invalidate(&self, template: &TemplateId) {
        let tick = self.tick();
        self.invalidated_at.lock().insert(template.clone(), tick);
        self.cache.invalidate(template);
        tracing::debug!(template = %template, "invalidated variant snapshot");
    }

    /// Invalidate every template in `templates`
    pub fn invalidate_many<'a>(&self, templates: impl IntoIterator<Item = &'a TemplateId>) {
        for template in templates {
            self.invalidate(template);
        }
    }

    /// Drop every cached snapshot
    pub fn clear(&self) {
        let tick = self.tick();
        self.cleared_at.store(tick, Ordering::SeqCst);
        self.invalidated_at.lock().clear();
        self.cache.invalidate_all();
        tracing::debug!("cleared all variant snapshots");
    }

    /// Attributes of `template` that at least one variant omits
    pub fn optional_attributes(&self, template: &TemplateId) -> CatalogResult<BTreeSet<AttributeName>> {
        Ok(self.snapshot(template)?.optional_attributes().clone())
    }

    /// Number of snapshots currently held
    pub fn cached_templates(&self) -> usize {
        self.cache.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{
        import, shirt_store, sqlite_from, CountingStore, GatedStore, CATALOG,
    };

    fn index_over(store: Arc<dyn CatalogStore>) -> VariantIndex {
        VariantIndex::new(store, &CacheConfig::default())
    }

    #[test]
    fn test_snapshot_views_agree() {
        let index = index_over(shirt_store());
        let snapshot = index.snapshot(&TemplateId::new("SHIRT")).unwrap();

        assert_eq!(snapshot.variant_count(), 3);
        assert_eq!(snapshot.triples().len(), 6);

        let red = snapshot.variants_with("Color", "Red").unwrap();
        assert_eq!(red.len(), 2);
        assert!(red.contains("SHIRT-S-RED"));
        assert!(red.contains("SHIRT-M-RED"));

        let assignment = snapshot.assignment("SHIRT-S-BLUE").unwrap();
        assert_eq!(assignment.get("Size").map(|v| v.as_str()), Some("S"));
        assert_eq!(assignment.get("Color").map(|v| v.as_str()), Some("Blue"));

        for triple in snapshot.triples() {
            assert!(snapshot
                .variants_with(triple.attribute.as_str(), triple.value.as_str())
                .unwrap()
                .contains(&triple.variant));
        }
    }

    #[test]
    fn test_unknown_template_is_empty_snapshot() {
        let index = index_over(shirt_store());
        let snapshot = index.snapshot(&TemplateId::new("NOPE")).unwrap();
        assert_eq!(snapshot.variant_count(), 0);
        assert!(snapshot.attribute_definitions().is_empty());
    }

    #[test]
    fn test_snapshot_is_memoized() {
        let store = Arc::new(CountingStore::new(shirt_store()));
        let index = index_over(store.clone());
        let template = TemplateId::new("SHIRT");

        let first = index.snapshot(&template).unwrap();
        let second = index.snapshot(&template).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.scans(), 1);
    }

    #[test]
    fn test_invalidate_rebuilds_identical_snapshot() {
        let store = Arc::new(CountingStore::new(shirt_store()));
        let index = index_over(store.clone());
        let template = TemplateId::new("SHIRT");

        let before = index.snapshot(&template).unwrap();
        index.invalidate(&template);
        let after = index.snapshot(&template).unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.same_content(&after));
        assert_eq!(store.scans(), 2);
    }

    #[test]
    fn test_reader_keeps_old_snapshot_across_invalidate() {
        let index = index_over(shirt_store());
        let template = TemplateId::new("SHIRT");

        let held = index.snapshot(&template).unwrap();
        index.clear();

        assert_eq!(held.variant_count(), 3);
        assert_eq!(index.cached_templates(), 0);
    }

    #[test]
    fn test_optional_attributes() {
        let index = index_over(shirt_store());
        assert!(index
            .optional_attributes(&TemplateId::new("SHIRT"))
            .unwrap()
            .is_empty());

        let optional = index
            .optional_attributes(&TemplateId::new("PEN"))
            .unwrap();
        assert_eq!(optional.len(), 1);
        assert!(optional.contains("Engraving"));
    }

    #[test]
    fn test_storage_failure_is_propagated() {
        let store = Arc::new(CountingStore::failing());
        let index = index_over(store);
        let err = index.snapshot(&TemplateId::new("SHIRT")).unwrap_err();
        assert_eq!(err.kind(), "storage_unavailable");
    }

    #[test]
    fn test_concurrent_readers_share_one_build() {
        let store = Arc::new(CountingStore::new(shirt_store()));
        let index = Arc::new(index_over(store.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    index
                        .snapshot(&TemplateId::new("SHIRT"))
                        .unwrap()
                        .variant_count()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 3);
        }
        assert_eq!(store.scans(), 1);
    }

    #[test]
    fn test_invalidate_during_build_discards_stale_scan() {
        let sqlite = sqlite_from(CATALOG);
        let store = Arc::new(GatedStore::new(sqlite.clone()));
        let index = Arc::new(index_over(store.clone()));
        let template = TemplateId::new("SHIRT");

        let (entered, release) = store.arm();
        let reader = {
            let index = Arc::clone(&index);
            let template = template.clone();
            std::thread::spawn(move || index.snapshot(&template).unwrap().variant_count())
        };

        // The scan has read three variants and is held before returning
        entered.recv().unwrap();
        import(
            &sqlite,
            "variants:\n  - { code: SHIRT-M-BLUE, variant_of: SHIRT, attributes: { Size: M, Color: Blue } }\n",
            "more.yaml",
        );
        index.invalidate(&template);
        release.send(()).unwrap();

        assert_eq!(reader.join().unwrap(), 4);
        assert_eq!(index.snapshot(&template).unwrap().variant_count(), 4);
    }
}
