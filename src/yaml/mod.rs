//! YAML catalog and config files
//!
//! Deserialization errors become [`YamlSyntaxError`] diagnostics that point
//! at the failing line of the file.

pub mod diagnostics;
pub mod parser;

pub use diagnostics::{YamlError, YamlSyntaxError};
pub use parser::{parse_yaml, parse_yaml_file};
