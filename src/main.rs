use clap::Parser;
use tracing_subscriber::EnvFilter;

use tagsnp::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("tagsnp=debug,info")
    } else {
        EnvFilter::new("tagsnp=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Import(args) => {
            cli::import::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Discover(args) => {
            cli::discover::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Export(args) => {
            cli::export::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
