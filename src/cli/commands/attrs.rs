//! `varsel attrs` command - Attributes and selectable values of a template

use miette::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{catalog_report, join_values, truncate_str};
use crate::cli::output::{effective_format, print_csv, print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat, Workspace};
use crate::core::identity::TemplateId;

#[derive(clap::Args, Debug)]
pub struct AttrsArgs {
    /// Template item code
    pub template: TemplateId,
}

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "ATTRIBUTE")]
    attribute: String,
    #[tabled(rename = "OPTIONAL")]
    optional: String,
    #[tabled(rename = "VALUES")]
    values: String,
}

pub fn run(args: AttrsArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let options = workspace
        .selector
        .get_attributes_and_values(&args.template)
        .map_err(catalog_report)?;

    match effective_format(global.format, true) {
        OutputFormat::Json => print_json(&options)?,
        OutputFormat::Yaml => print_yaml(&options)?,
        OutputFormat::Csv => print_csv(
            &["attribute", "optional", "values"],
            options.iter().map(|o| {
                [
                    o.attribute.to_string(),
                    o.optional.to_string(),
                    o.values
                        .iter()
                        .map(|v| v.as_str())
                        .collect::<Vec<_>>()
                        .join(";"),
                ]
            }),
        )?,
        OutputFormat::Id => {
            for option in &options {
                println!("{}", option.attribute);
            }
        }
        _ => {
            let rows = options.iter().map(|o| AttributeRow {
                attribute: o.attribute.to_string(),
                optional: if o.optional { "yes" } else { "" }.to_string(),
                values: truncate_str(&join_values(&o.values), 60),
            });
            println!("{}", Table::new(rows).with(Style::sharp()));
        }
    }
    Ok(())
}
