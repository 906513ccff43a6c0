use clap::Parser;
use miette::Result;
use varsel::cli::commands;
use varsel::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Render YAML and catalog errors with source snippets
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::Init(args) => commands::init::run(args, global),
        Commands::Sync => commands::sync::run(global),
        Commands::Templates => commands::templates::run(global),
        Commands::Attrs(args) => commands::attrs::run(args, global),
        Commands::Next(args) => commands::next::run(args, global),
        Commands::Match(args) => commands::matching::run(args, global),
        Commands::Rpc => commands::rpc::run(global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
