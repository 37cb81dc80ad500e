use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod matching;
mod parsing;
mod utils;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("recipe_finder=debug,info")
    } else {
        EnvFilter::new("recipe_finder=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Find(args) => {
            cli::find::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Suggest(args) => {
            cli::suggest::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Corpus(args) => {
            cli::corpus::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Session(args) => {
            cli::session::run(args, cli.format)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
