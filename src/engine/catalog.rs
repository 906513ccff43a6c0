//! Ordered attributes and selectable values of a template
//!
//! Values come from the global per-attribute list, filtered down to those
//! at least one enabled variant of the template actually uses. Offering only
//! these is what keeps a shopper from picking a dead end on the first click.

use serde::Serialize;
use std::sync::Arc;

use crate::core::error::{CatalogError, CatalogResult};
use crate::core::identity::{AttributeDefinition, AttributeName, AttributeValue, TemplateId};
use crate::engine::index::{VariantIndex, VariantSnapshot};
use crate::store::CatalogStore;

/// One attribute with the values a shopper may pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeOptions {
    pub attribute: AttributeName,
    pub optional: bool,
    pub values: Vec<AttributeValue>,
}

pub struct AttributeCatalog {
    store: Arc<dyn CatalogStore>,
    index: Arc<VariantIndex>,
}

impl AttributeCatalog {
    pub fn new(store: Arc<dyn CatalogStore>, index: Arc<VariantIndex>) -> Self {
        Self { store, index }
    }

    /// Declared attributes of `template`, ordered by position
    pub fn attributes(&self, template: &TemplateId) -> CatalogResult<Vec<AttributeDefinition>> {
        let snapshot = self.index.snapshot(template)?;
        definitions_of(&snapshot)
    }

    /// Selectable values of one attribute, in global list order
    pub fn values_for(
        &self,
        template: &TemplateId,
        attribute: &AttributeName,
    ) -> CatalogResult<Vec<AttributeValue>> {
        let snapshot = self.index.snapshot(template)?;
        self.values_in(&snapshot, attribute)
    }

    /// Every attribute of `template` with its selectable values
    ///
    /// All attributes are read from the same snapshot.
    pub fn attributes_and_values(
        &self,
        template: &TemplateId,
    ) -> CatalogResult<Vec<AttributeOptions>> {
        let snapshot = self.index.snapshot(template)?;
        definitions_of(&snapshot)?
            .into_iter()
            .map(|def| {
                let values = self.values_in(&snapshot, &def.attribute)?;
                Ok(AttributeOptions {
                    attribute: def.attribute,
                    optional: def.optional,
                    values,
                })
            })
            .collect()
    }

    fn values_in(
        &self,
        snapshot: &VariantSnapshot,
        attribute: &AttributeName,
    ) -> CatalogResult<Vec<AttributeValue>> {
        let ordered = self.store.global_attribute_values(attribute)?;
        Ok(ordered
            .into_iter()
            .filter(|value| snapshot.has_value(attribute.as_str(), value.as_str()))
            .collect())
    }
}

/// Definitions of a snapshot, or `UnknownTemplate` when there are none
pub(crate) fn definitions_of(snapshot: &VariantSnapshot) -> CatalogResult<Vec<AttributeDefinition>> {
    let definitions = snapshot.attribute_definitions();
    if definitions.is_empty() {
        return Err(CatalogError::UnknownTemplate {
            template: snapshot.template().clone(),
        });
    }
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CacheConfig;
    use crate::engine::testing::{shirt_store, store_from};

    fn catalog_over(store: Arc<dyn CatalogStore>) -> AttributeCatalog {
        let index = Arc::new(VariantIndex::new(store.clone(), &CacheConfig::default()));
        AttributeCatalog::new(store, index)
    }

    fn strs(values: &[AttributeValue]) -> Vec<&str> {
        values.iter().map(|v| v.as_str()).collect()
    }

    #[test]
    fn test_attributes_in_declared_order() {
        let catalog = catalog_over(shirt_store());
        let attrs = catalog.attributes(&TemplateId::new("SHIRT")).unwrap();

        let names: Vec<&str> = attrs.iter().map(|a| a.attribute.as_str()).collect();
        assert_eq!(names, vec!["Size", "Color"]);
        assert_eq!(attrs[0].idx, 0);
        assert_eq!(attrs[1].idx, 1);
        assert!(attrs.iter().all(|a| !a.optional));
    }

    #[test]
    fn test_optional_flag() {
        let catalog = catalog_over(shirt_store());
        let attrs = catalog.attributes(&TemplateId::new("PEN")).unwrap();
        assert!(!attrs[0].optional);
        assert_eq!(attrs[1].attribute.as_str(), "Engraving");
        assert!(attrs[1].optional);
    }

    #[test]
    fn test_unknown_template_is_error() {
        let catalog = catalog_over(shirt_store());
        let err = catalog.attributes(&TemplateId::new("HAT")).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownTemplate {
                template: TemplateId::new("HAT")
            }
        );
    }

    #[test]
    fn test_values_filtered_to_used_in_global_order() {
        let catalog = catalog_over(shirt_store());
        let template = TemplateId::new("SHIRT");

        // XS and L have no shirt variant; Green neither
        let sizes = catalog
            .values_for(&template, &AttributeName::new("Size"))
            .unwrap();
        assert_eq!(strs(&sizes), vec!["S", "M"]);

        // Global order is Green, Red, Blue
        let colors = catalog
            .values_for(&template, &AttributeName::new("Color"))
            .unwrap();
        assert_eq!(strs(&colors), vec!["Red", "Blue"]);
    }

    #[test]
    fn test_global_order_wins_over_frequency() {
        let store = store_from(
            r#"
attributes:
  - name: Size
    values: [L, M, S]
templates:
  - code: T
    attributes: [Size]
variants:
  - { code: T-S1, variant_of: T, attributes: { Size: S } }
  - { code: T-S2, variant_of: T, attributes: { Size: S } }
  - { code: T-S3, variant_of: T, attributes: { Size: S } }
  - { code: T-L, variant_of: T, attributes: { Size: L } }
"#,
        );
        let catalog = catalog_over(store);
        let sizes = catalog
            .values_for(&TemplateId::new("T"), &AttributeName::new("Size"))
            .unwrap();
        assert_eq!(strs(&sizes), vec!["L", "S"]);
    }

    #[test]
    fn test_attributes_and_values() {
        let catalog = catalog_over(shirt_store());
        let options = catalog
            .attributes_and_values(&TemplateId::new("PEN"))
            .unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].attribute.as_str(), "Size");
        assert_eq!(strs(&options[0].values), vec!["M"]);
        assert!(options[1].optional);
        assert_eq!(strs(&options[1].values), vec!["Gold"]);
    }
}
