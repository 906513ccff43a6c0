//! Item lookup by multi-attribute filters
//!
//! Runs straight against storage rather than a template snapshot, so one
//! filter may span several templates. Values for the same attribute are
//! OR-ed; different attributes are AND-ed.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::core::error::{CatalogError, CatalogResult};
use crate::core::identity::{AttributeName, AttributeValue, TemplateId, VariantId};
use crate::store::CatalogStore;

/// Either a single value or a list of values for one attribute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FilterValues {
    One(AttributeValue),
    Many(Vec<AttributeValue>),
}

impl FilterValues {
    fn into_vec(self) -> Vec<AttributeValue> {
        match self {
            FilterValues::One(value) => vec![value],
            FilterValues::Many(values) => values,
        }
    }
}

/// Attribute → accepted values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeFilters(BTreeMap<AttributeName, BTreeSet<AttributeValue>>);

impl AttributeFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: accept any of `values` for `attribute`
    pub fn with<V>(mut self, attribute: impl Into<AttributeName>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<AttributeValue>,
    {
        self.0
            .entry(attribute.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Parse a client filter object
    ///
    /// Each attribute maps to a string or a list of strings; anything else
    /// is rejected as `InvalidFilter`.
    pub fn from_json(value: &Value) -> CatalogResult<Self> {
        if !value.is_object() {
            return Err(CatalogError::invalid_filter(
                "attribute filters must be an object of attribute to values",
            ));
        }
        let raw: BTreeMap<AttributeName, FilterValues> = serde_json::from_value(value.clone())
            .map_err(|_| {
                CatalogError::invalid_filter(
                    "each attribute filter must be a string or a list of strings",
                )
            })?;

        Ok(Self(
            raw.into_iter()
                .map(|(attribute, values)| (attribute, values.into_vec().into_iter().collect()))
                .collect(),
        ))
    }

    /// Attributes that carry at least one value
    pub fn usable(&self) -> impl Iterator<Item = (&AttributeName, &BTreeSet<AttributeValue>)> {
        self.0.iter().filter(|(_, values)| !values.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct MultiAttributeQuery {
    store: Arc<dyn CatalogStore>,
}

impl MultiAttributeQuery {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Items matching every usable attribute filter
    ///
    /// Attributes with no values are skipped. When no attribute is usable
    /// the result is empty.
    pub fn matches(
        &self,
        filters: &AttributeFilters,
        template: Option<&TemplateId>,
    ) -> CatalogResult<BTreeSet<VariantId>> {
        let mut result: Option<BTreeSet<VariantId>> = None;

        for (attribute, values) in filters.usable() {
            let values: Vec<AttributeValue> = values.iter().cloned().collect();
            let items = self.store.items_with_any_value(attribute, &values, template)?;

            let narrowed = match result.take() {
                None => items,
                Some(mut acc) => {
                    acc.retain(|item| items.contains(item));
                    acc
                }
            };
            if narrowed.is_empty() {
                return Ok(narrowed);
            }
            result = Some(narrowed);
        }

        if result.is_none() {
            tracing::debug!("no usable attribute filters; returning no items");
        }
        Ok(result.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::shirt_store;
    use serde_json::json;

    fn ids(items: &BTreeSet<VariantId>) -> Vec<&str> {
        items.iter().map(|i| i.as_str()).collect()
    }

    #[test]
    fn test_values_of_one_attribute_are_ored() {
        let query = MultiAttributeQuery::new(shirt_store());
        let filters = AttributeFilters::new().with("Color", ["Red", "Blue"]);
        let items = query.matches(&filters, None).unwrap();
        assert_eq!(ids(&items), vec!["SHIRT-M-RED", "SHIRT-S-BLUE", "SHIRT-S-RED"]);
    }

    #[test]
    fn test_attributes_are_anded() {
        let query = MultiAttributeQuery::new(shirt_store());
        let filters = AttributeFilters::new()
            .with("Color", ["Red"])
            .with("Size", ["M"]);
        let items = query.matches(&filters, None).unwrap();
        assert_eq!(ids(&items), vec!["SHIRT-M-RED"]);
    }

    #[test]
    fn test_spans_templates_unless_restricted() {
        let query = MultiAttributeQuery::new(shirt_store());
        let filters = AttributeFilters::new().with("Size", ["M"]);

        let all = query.matches(&filters, None).unwrap();
        assert_eq!(ids(&all), vec!["PEN-M", "PEN-M-GOLD", "SHIRT-M-RED"]);

        let pens = query
            .matches(&filters, Some(&TemplateId::new("PEN")))
            .unwrap();
        assert_eq!(ids(&pens), vec!["PEN-M", "PEN-M-GOLD"]);
    }

    #[test]
    fn test_empty_value_list_is_skipped() {
        let query = MultiAttributeQuery::new(shirt_store());
        let filters = AttributeFilters::from_json(&json!({"Color": ["Blue"], "Size": []})).unwrap();
        let items = query.matches(&filters, None).unwrap();
        assert_eq!(ids(&items), vec!["SHIRT-S-BLUE"]);
    }

    #[test]
    fn test_no_usable_filters_is_empty() {
        let query = MultiAttributeQuery::new(shirt_store());
        let filters = AttributeFilters::from_json(&json!({"Size": []})).unwrap();
        assert!(query.matches(&filters, None).unwrap().is_empty());
        assert!(query.matches(&AttributeFilters::new(), None).unwrap().is_empty());
    }

    #[test]
    fn test_single_string_value_accepted() {
        let filters = AttributeFilters::from_json(&json!({"Color": "Red"})).unwrap();
        assert_eq!(filters, AttributeFilters::new().with("Color", ["Red"]));
    }

    #[test]
    fn test_malformed_filters_rejected() {
        for bad in [
            json!({"Color": 7}),
            json!({"Color": {"any": "Red"}}),
            json!({"Color": ["Red", 3]}),
            json!(["Color", "Red"]),
            json!("Color=Red"),
        ] {
            let err = AttributeFilters::from_json(&bad).unwrap_err();
            assert_eq!(err.kind(), "invalid_filter", "input {}", bad);
        }
    }
}
