//! Shared helper functions for CLI commands

use miette::Report;

use crate::core::error::{CatalogError, StoreError};
use crate::core::identity::AttributeValue;
use crate::yaml::YamlError;

/// Turn a store error into a report, keeping YAML source diagnostics
pub fn store_report(err: StoreError) -> Report {
    match err {
        StoreError::Yaml(YamlError::Syntax(syntax)) => Report::new(syntax),
        other => miette::miette!("{}", other),
    }
}

/// Turn an engine error into a report
pub fn catalog_report(err: CatalogError) -> Report {
    match &err {
        CatalogError::UnknownTemplate { .. } => miette::miette!(
            help = "run `varsel templates` to list known templates",
            "{}",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Join values for a single table cell
pub fn join_values<'a>(values: impl IntoIterator<Item = &'a AttributeValue>) -> String {
    values
        .into_iter()
        .map(|v| v.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("größenübersicht", 8), "größe...");
    }

    #[test]
    fn test_join_values() {
        let values = [AttributeValue::new("Red"), AttributeValue::new("Blue")];
        assert_eq!(join_values(&values), "Red, Blue");
        assert_eq!(join_values(&Vec::<AttributeValue>::new()), "");
    }
}
