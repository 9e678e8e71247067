//! kvreplay CLI entry point

use anyhow::{Context, Result};
use kvreplay::config::{cli::Cli, cli_convert, validator};
use kvreplay::output::text;
use kvreplay::{runner, util};

fn main() -> Result<()> {
    util::logging::init();

    let cli = Cli::parse_args();
    let config = cli_convert::build_replay_config(&cli);
    validator::validate_replay(&config).context("Configuration validation failed")?;

    if !cli.quiet {
        println!("kvreplay v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Configuration:");
        for line in config.to_string().lines() {
            println!("  {}", line);
        }
        println!();
    }

    let outcome = runner::run(&config)?;

    if !cli.quiet {
        text::print_results(&outcome.summary, &outcome.recorder)?;
    }

    Ok(())
}
