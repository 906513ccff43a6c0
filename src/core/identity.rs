//! Typed identifiers for templates, variants, attributes and values
//!
//! All four are plain strings on the wire and in storage, but they are kept
//! as distinct types so an attribute name can never be passed where a value
//! or an item code is expected.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw string
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the underlying string
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Item code of a configurable product template (e.g. `SHIRT`)
    TemplateId
);

string_id!(
    /// Item code of one concrete, purchasable variant (e.g. `SHIRT-S-RED`)
    VariantId
);

string_id!(
    /// Name of an axis of variation (e.g. `Color`)
    AttributeName
);

string_id!(
    /// One legal value on an attribute axis (e.g. `Red`)
    AttributeValue
);

/// One denormalized (variant, attribute, value) row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantTriple {
    pub variant: VariantId,
    pub attribute: AttributeName,
    pub value: AttributeValue,
}

impl VariantTriple {
    pub fn new(
        variant: impl Into<VariantId>,
        attribute: impl Into<AttributeName>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            variant: variant.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// An attribute as declared on a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub attribute: AttributeName,
    pub idx: u32,
    /// True when at least one variant of the template omits this attribute
    pub optional: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_display_and_as_str() {
        let id = TemplateId::new("SHIRT");
        assert_eq!(id.to_string(), "SHIRT");
        assert_eq!(id.as_str(), "SHIRT");
        assert_eq!(id.into_inner(), "SHIRT".to_string());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&VariantId::new("SHIRT-S-RED")).unwrap();
        assert_eq!(json, "\"SHIRT-S-RED\"");

        let name: AttributeName = serde_json::from_str("\"Size\"").unwrap();
        assert_eq!(name, AttributeName::new("Size"));
    }

    #[test]
    fn test_borrow_allows_str_lookup() {
        let mut map = BTreeMap::new();
        map.insert(AttributeName::new("Color"), 1);
        assert_eq!(map.get("Color"), Some(&1));
    }
}
