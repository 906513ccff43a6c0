//! `varsel match` command - Find item codes by attribute filters

use console::style;
use miette::Result;

use crate::cli::filters::{to_filters, FilterArg};
use crate::cli::helpers::catalog_report;
use crate::cli::output::{effective_format, print_csv, print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat, Workspace};
use crate::core::identity::TemplateId;

#[derive(clap::Args, Debug)]
pub struct MatchArgs {
    /// Accepted values, as ATTRIBUTE=V1,V2 (repeatable)
    #[arg(long = "filter", short = 'F', value_name = "ATTR=VALUES")]
    pub filter: Vec<FilterArg>,

    /// Only consider variants of this template
    #[arg(long, short = 't')]
    pub template: Option<TemplateId>,
}

pub fn run(args: MatchArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let filters = to_filters(&args.filter);
    let items = workspace
        .selector
        .match_filters(&filters, args.template.as_ref())
        .map_err(catalog_report)?;

    match effective_format(global.format, true) {
        OutputFormat::Json => print_json(&items)?,
        OutputFormat::Yaml => print_yaml(&items)?,
        OutputFormat::Csv => print_csv(&["item_code"], items.iter().map(|i| [i.as_str()]))?,
        OutputFormat::Id => {
            for item in &items {
                println!("{}", item);
            }
        }
        _ => {
            if items.is_empty() {
                println!("No matching items.");
                return Ok(());
            }
            for item in &items {
                println!("{}", item);
            }
            println!();
            println!("{} item(s) found", style(items.len()).cyan());
        }
    }
    Ok(())
}
