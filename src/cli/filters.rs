//! Attribute arguments for CLI commands
//!
//! `--select Size=M` picks one value; `--filter Color=Red,Blue` accepts any
//! of several. An empty right-hand side (`--filter Size=`) is allowed and
//! means "no constraint".

use std::str::FromStr;

use crate::core::identity::{AttributeName, AttributeValue};
use crate::engine::{AttributeFilters, Selection};

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    let (attribute, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ATTRIBUTE=VALUE, got '{}'", s))?;
    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(format!("missing attribute name in '{}'", s));
    }
    Ok((attribute, value.trim()))
}

/// One `ATTRIBUTE=VALUE` selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectArg {
    pub attribute: AttributeName,
    pub value: AttributeValue,
}

impl FromStr for SelectArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (attribute, value) = split_pair(s)?;
        if value.is_empty() {
            return Err(format!("missing value in '{}'", s));
        }
        Ok(Self {
            attribute: attribute.into(),
            value: value.into(),
        })
    }
}

/// One `ATTRIBUTE=V1,V2,...` filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub attribute: AttributeName,
    pub values: Vec<AttributeValue>,
}

impl FromStr for FilterArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (attribute, values) = split_pair(s)?;
        Ok(Self {
            attribute: attribute.into(),
            values: values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(AttributeValue::from)
                .collect(),
        })
    }
}

/// Collect `--select` arguments; a later pick for the same attribute wins
pub fn to_selection(args: &[SelectArg]) -> Selection {
    args.iter()
        .map(|a| (a.attribute.clone(), a.value.clone()))
        .collect()
}

/// Collect `--filter` arguments; repeated attributes accumulate values
pub fn to_filters(args: &[FilterArg]) -> AttributeFilters {
    args.iter().fold(AttributeFilters::new(), |filters, arg| {
        filters.with(arg.attribute.clone(), arg.values.iter().cloned())
    })
}
