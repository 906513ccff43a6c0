//! Diagnostics for YAML catalog files
//!
//! Syntax errors keep the whole source so miette can render the offending
//! line with a label pointing at the failure location.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised while reading a YAML file
#[derive(Debug, Error)]
pub enum YamlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Syntax(#[from] YamlSyntaxError),
}

/// A YAML syntax or shape error with source context
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(code(varsel::yaml::syntax), help("check indentation and the catalog file layout"))]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    /// Build a diagnostic from a serde_yml error and the text it failed on
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = err
            .location()
            .map(|loc| SourceSpan::from((loc.index().min(content.len()), 1)));

        Self {
            filename: filename.to_string(),
            message: err.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}
