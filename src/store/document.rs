//! Catalog file format
//!
//! One YAML file may carry any mix of global attribute value lists,
//! templates, and variants. Variants may reference templates declared in
//! other files.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::error::StoreError;
use crate::core::identity::{AttributeName, AttributeValue, TemplateId, VariantId};

/// Global ordered value list for one attribute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeValues {
    pub name: AttributeName,
    pub values: Vec<AttributeValue>,
}

/// A configurable product and its ordered attribute axes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateDoc {
    pub code: TemplateId,
    pub attributes: Vec<AttributeName>,
}

/// A concrete variant of a template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDoc {
    pub code: VariantId,
    pub variant_of: TemplateId,

    /// Disabled variants are stored but never offered for selection
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,

    #[serde(default)]
    pub attributes: BTreeMap<AttributeName, AttributeValue>,
}

/// Contents of one catalog file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogDocument {
    pub attributes: Vec<AttributeValues>,
    pub templates: Vec<TemplateDoc>,
    pub variants: Vec<VariantDoc>,
}

impl CatalogDocument {
    /// Check the document is self-consistent
    ///
    /// Cross-file references (a variant of a template declared elsewhere)
    /// are not checked here.
    pub fn validate(&self, source: &str) -> Result<(), StoreError> {
        let invalid = |message: String| StoreError::InvalidCatalog {
            file: source.to_string(),
            message,
        };

        let mut attribute_names = BTreeSet::new();
        for list in &self.attributes {
            if list.name.as_str().trim().is_empty() {
                return Err(invalid("attribute with empty name".to_string()));
            }
            if !attribute_names.insert(&list.name) {
                return Err(invalid(format!("attribute {} listed twice", list.name)));
            }
            let mut seen = BTreeSet::new();
            for value in &list.values {
                if value.as_str().trim().is_empty() {
                    return Err(invalid(format!("empty value listed for attribute {}", list.name)));
                }
                if !seen.insert(value) {
                    return Err(invalid(format!(
                        "value {} listed twice for attribute {}",
                        value, list.name
                    )));
                }
            }
        }

        let mut codes = BTreeSet::new();
        for template in &self.templates {
            if template.code.as_str().trim().is_empty() {
                return Err(invalid("template with empty code".to_string()));
            }
            if !codes.insert(template.code.as_str()) {
                return Err(invalid(format!("item {} declared twice", template.code)));
            }
            let mut seen = BTreeSet::new();
            for attribute in &template.attributes {
                if !seen.insert(attribute) {
                    return Err(invalid(format!(
                        "template {} lists attribute {} twice",
                        template.code, attribute
                    )));
                }
            }
        }

        for variant in &self.variants {
            if variant.code.as_str().trim().is_empty() {
                return Err(invalid("variant with empty code".to_string()));
            }
            if !codes.insert(variant.code.as_str()) {
                return Err(invalid(format!("item {} declared twice", variant.code)));
            }
            if variant.variant_of.as_str() == variant.code.as_str() {
                return Err(invalid(format!("variant {} is a variant of itself", variant.code)));
            }
            // Selections treat empty values as unselected
            if let Some((attribute, _)) = variant
                .attributes
                .iter()
                .find(|(_, value)| value.as_str().trim().is_empty())
            {
                return Err(invalid(format!(
                    "variant {} has an empty value for {}",
                    variant.code, attribute
                )));
            }
        }

        Ok(())
    }

    /// Templates this document declares or adds variants to
    pub fn touched_templates(&self) -> BTreeSet<TemplateId> {
        self.templates
            .iter()
            .map(|t| t.code.clone())
            .chain(self.variants.iter().map(|v| v.variant_of.clone()))
            .collect()
    }
}
