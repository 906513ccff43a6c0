//! Typed YAML loading for catalog and config files

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Deserialize `content`, naming `filename` in any diagnostic
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|err| YamlSyntaxError::from_serde_error(&err, content, filename).into())
}

/// Read and deserialize a YAML file
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = fs::read_to_string(path)?;
    parse_yaml(&content, &path.display().to_string())
}
