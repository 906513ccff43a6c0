//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Tsv
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

/// Print a value as YAML
pub fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    print!("{}", serde_yml::to_string(value).into_diagnostic()?);
    Ok(())
}

/// Write rows as CSV to stdout
pub fn print_csv<I, R>(header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(header).into_diagnostic()?;
    for row in rows {
        writer.write_record(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}
