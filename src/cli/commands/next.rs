//! `varsel next` command - Narrow a template by selected values

use console::style;
use miette::Result;

use crate::cli::filters::{to_selection, SelectArg};
use crate::cli::helpers::{catalog_report, join_values};
use crate::cli::output::{print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat, Workspace};
use crate::core::identity::{AttributeValue, TemplateId};

#[derive(clap::Args, Debug)]
pub struct NextArgs {
    /// Template item code
    pub template: TemplateId,

    /// Selected value, as ATTRIBUTE=VALUE (repeatable)
    #[arg(long = "select", short = 's', value_name = "ATTR=VALUE")]
    pub select: Vec<SelectArg>,

    /// Show values still reachable and the remaining candidates
    #[arg(long)]
    pub detail: bool,
}

pub fn run(args: NextArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let selection = to_selection(&args.select);
    let narrowing = workspace
        .selector
        .narrow_selection(&args.template, &selection)
        .map_err(catalog_report)?;

    match global.format {
        OutputFormat::Json if args.detail => return print_json(&narrowing),
        OutputFormat::Json => return print_json(&narrowing.exact_match),
        OutputFormat::Yaml if args.detail => return print_yaml(&narrowing),
        OutputFormat::Yaml => return print_yaml(&narrowing.exact_match),
        OutputFormat::Id => {
            if let Some(code) = &narrowing.exact_match {
                println!("{}", code);
            }
            return Ok(());
        }
        _ => {}
    }

    match &narrowing.exact_match {
        Some(code) => println!("{}", style(code).green()),
        None => println!("{}", style("none").dim()),
    }

    if args.detail {
        // Reachable values follow the order shown by `varsel attrs`
        let options = workspace
            .selector
            .get_attributes_and_values(&args.template)
            .map_err(catalog_report)?;

        println!();
        for option in &options {
            let Some(reachable) = narrowing.reachable.get(&option.attribute) else {
                continue;
            };
            let ordered: Vec<&AttributeValue> = option
                .values
                .iter()
                .filter(|v| reachable.contains(*v))
                .collect();
            let marker = match selection.get(option.attribute.as_str()) {
                Some(value) => format!(" = {}", style(value).yellow()),
                None => String::new(),
            };
            println!(
                "{}{}: {}",
                style(&option.attribute).bold(),
                marker,
                join_values(ordered)
            );
        }

        println!();
        println!(
            "{} candidate variant(s)",
            style(narrowing.filtered_items_count).cyan()
        );
        if let Some(items) = &narrowing.filtered_items {
            for item in items {
                println!("  {}", item);
            }
        }
    }
    Ok(())
}
