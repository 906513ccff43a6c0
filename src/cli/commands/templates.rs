//! `varsel templates` command - List configurable templates

use miette::Result;

use crate::cli::helpers::catalog_report;
use crate::cli::output::{effective_format, print_csv, print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat, Workspace};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let templates = workspace.selector.templates().map_err(catalog_report)?;

    match effective_format(global.format, true) {
        OutputFormat::Json => print_json(&templates)?,
        OutputFormat::Yaml => print_yaml(&templates)?,
        OutputFormat::Csv => print_csv(&["template"], templates.iter().map(|t| [t.as_str()]))?,
        _ => {
            for template in &templates {
                println!("{}", template);
            }
        }
    }
    Ok(())
}
