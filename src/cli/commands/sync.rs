//! `varsel sync` command - Import catalog files

use console::style;
use miette::Result;

use crate::cli::output::{print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat, Workspace};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open_without_sync(global)?;
    let stats = workspace.sync()?;

    // Auto stays human-readable; structured output only on request
    match global.format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Yaml => print_yaml(&stats)?,
        _ => {
            if stats.is_noop() {
                println!("{} Catalog up to date", style("✓").green());
            } else {
                println!(
                    "{} Synced catalog: {} added, {} updated, {} removed, {} unchanged",
                    style("✓").green(),
                    stats.files_added,
                    stats.files_updated,
                    stats.files_removed,
                    stats.files_unchanged
                );
                for template in &stats.templates_touched {
                    println!("  {}", style(template).cyan());
                }
            }
        }
    }
    Ok(())
}
