//! Progressive narrowing of a template by attribute selection
//!
//! Given a partial selection, [`NarrowingEngine::next`] reports which values
//! of every attribute are still reachable and whether the selection already
//! pins down exactly one variant. The engine keeps no session state; the
//! caller passes the whole selection on every call.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::core::error::{CatalogError, CatalogResult};
use crate::core::identity::{AttributeName, AttributeValue, TemplateId, VariantId};
use crate::engine::catalog::definitions_of;
use crate::engine::index::{VariantIndex, VariantSnapshot};

/// At most this many remaining variants are listed in a [`Narrowing`]
pub const FILTERED_ITEMS_LIMIT: usize = 10;

/// A partial attribute selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<AttributeName, AttributeValue>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, attribute: impl Into<AttributeName>, value: impl Into<AttributeValue>) -> Self {
        self.insert(attribute, value);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<AttributeName>, value: impl Into<AttributeValue>) {
        self.0.insert(attribute.into(), value.into());
    }

    pub fn remove(&mut self, attribute: &str) -> Option<AttributeValue> {
        self.0.remove(attribute)
    }

    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.0.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeName, &AttributeValue)> {
        self.0.iter()
    }

    /// Parse a selection sent by a client
    ///
    /// Accepts a JSON object of attribute → value, or a string holding such
    /// an object. Null or empty-string values mean "not selected" and are
    /// dropped.
    pub fn from_json(value: &Value) -> CatalogResult<Self> {
        match value {
            Value::String(encoded) => {
                let decoded: Value = serde_json::from_str(encoded).map_err(|e| {
                    CatalogError::invalid_filter(format!("selection is not valid JSON: {}", e))
                })?;
                match decoded {
                    Value::Object(_) => Self::from_json(&decoded),
                    _ => Err(CatalogError::invalid_filter(
                        "selection must be an object of attribute to value",
                    )),
                }
            }
            Value::Object(map) => {
                let mut selection = Selection::new();
                for (attribute, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) if s.is_empty() => {}
                        Value::String(s) => selection.insert(attribute.as_str(), s.as_str()),
                        other => {
                            return Err(CatalogError::invalid_filter(format!(
                                "selected value for {} must be a string, got {}",
                                attribute, other
                            )))
                        }
                    }
                }
                Ok(selection)
            }
            Value::Null => Ok(Selection::new()),
            _ => Err(CatalogError::invalid_filter(
                "selection must be an object of attribute to value",
            )),
        }
    }
}

impl<A, V> FromIterator<(A, V)> for Selection
where
    A: Into<AttributeName>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (A, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(a, v)| (a.into(), v.into()))
                .collect(),
        )
    }
}

/// Result of one narrowing step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrowing {
    /// Values still reachable per declared attribute; a selected attribute
    /// maps to its selected value only
    pub reachable: BTreeMap<AttributeName, BTreeSet<AttributeValue>>,

    /// The variant the selection identifies, if exactly determined
    pub exact_match: Option<VariantId>,

    /// Number of variants consistent with the selection
    pub filtered_items_count: usize,

    /// Those variants, when there are at most [`FILTERED_ITEMS_LIMIT`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_items: Option<Vec<VariantId>>,
}

pub struct NarrowingEngine {
    index: Arc<VariantIndex>,
}

impl NarrowingEngine {
    pub fn new(index: Arc<VariantIndex>) -> Self {
        Self { index }
    }

    /// Narrow `template` by `selection`
    pub fn next(&self, template: &TemplateId, selection: &Selection) -> CatalogResult<Narrowing> {
        let snapshot = self.index.snapshot(template)?;
        narrow(&snapshot, selection)
    }
}

/// Narrow one snapshot by `selection`
pub fn narrow(snapshot: &VariantSnapshot, selection: &Selection) -> CatalogResult<Narrowing> {
    let attrs = definitions_of(snapshot)?;
    let filtered = filter_variants(snapshot, selection);

    let mut reachable: BTreeMap<AttributeName, BTreeSet<AttributeValue>> = attrs
        .iter()
        .map(|def| {
            let mut values = BTreeSet::new();
            if let Some(chosen) = selection.get(def.attribute.as_str()) {
                values.insert(chosen.clone());
            }
            (def.attribute.clone(), values)
        })
        .collect();

    for triple in snapshot.triples() {
        if selection.contains(triple.attribute.as_str()) || !filtered.contains(&triple.variant) {
            continue;
        }
        if let Some(values) = reachable.get_mut(triple.attribute.as_str()) {
            values.insert(triple.value.clone());
        }
    }

    let required = attrs.len().saturating_sub(snapshot.optional_attributes().len());
    let exact_match = if selection.len() >= required {
        exact_match(snapshot, &filtered, selection)
    } else {
        None
    };

    let filtered_items = (filtered.len() <= FILTERED_ITEMS_LIMIT)
        .then(|| filtered.iter().cloned().collect());

    Ok(Narrowing {
        reachable,
        exact_match,
        filtered_items_count: filtered.len(),
        filtered_items,
    })
}

/// Variants whose assignment contains every selected pair
fn filter_variants(snapshot: &VariantSnapshot, selection: &Selection) -> BTreeSet<VariantId> {
    if selection.is_empty() {
        return snapshot.variants().map(|(id, _)| id.clone()).collect();
    }

    let mut sets = Vec::with_capacity(selection.len());
    for (attribute, value) in selection.iter() {
        match snapshot.variants_with(attribute.as_str(), value.as_str()) {
            Some(set) => sets.push(set),
            None => return BTreeSet::new(),
        }
    }

    // Intersect starting from the smallest set
    sets.sort_by_key(|set| set.len());
    let mut filtered = sets[0].clone();
    for set in &sets[1..] {
        filtered.retain(|variant| set.contains(variant));
        if filtered.is_empty() {
            break;
        }
    }
    filtered
}

/// The filtered variant whose assigned attributes are exactly the selected
/// ones; lowest id wins if the data allows more than one
fn exact_match(
    snapshot: &VariantSnapshot,
    filtered: &BTreeSet<VariantId>,
    selection: &Selection,
) -> Option<VariantId> {
    let mut candidates = filtered.iter().filter(|variant| {
        snapshot
            .assignment(variant.as_str())
            .is_some_and(|assignment| assignment.keys().eq(selection.iter().map(|(a, _)| a)))
    });

    let first = candidates.next()?;
    let others: Vec<&VariantId> = candidates.collect();
    if !others.is_empty() {
        tracing::warn!(
            template = %snapshot.template(),
            chosen = %first,
            also_matching = ?others,
            "ambiguous exact match; picking the lowest variant id"
        );
    }
    Some(first.clone())
}
