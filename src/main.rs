use clap::Parser;
use csvdelta::config::Cli;
use csvdelta::ui::init_logging;
use csvdelta::Config;
use std::time::Instant;

fn runner() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity, cli.quiet);
    log::trace!("CLI options set: {:?}", cli);

    log::debug!("Running csvdelta v{} [{}]", csvdelta::VERSION, cli.command.name());

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    let start = Instant::now();
    csvdelta::commands::run(config)?;
    log::debug!("Total execution time: {:.2?}", start.elapsed());

    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
