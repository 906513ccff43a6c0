//! `varsel init` command - Create a project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config of an existing project
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let root = match &global.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().into_diagnostic()?,
    };

    match Project::init(&root, args.force) {
        Ok(project) => {
            println!(
                "{} Initialized varsel project in {}",
                style("✓").green(),
                project.root().display()
            );
            println!(
                "  Add catalog files under {} and run {}",
                style("catalog/").cyan(),
                style("varsel sync").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Project already exists at {} (use --force to reinitialize)",
                style("!").yellow(),
                path.display()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
