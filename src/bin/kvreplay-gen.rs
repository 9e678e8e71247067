//! kvreplay-gen: write a synthetic workload file

use anyhow::{Context, Result};
use kvreplay::config::{cli::GenCli, cli_convert};
use kvreplay::util::{self, time::format_number};
use kvreplay::workload::generate::generate;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

fn main() -> Result<()> {
    util::logging::init();

    let cli = GenCli::parse_args();
    let config = cli_convert::build_generator_config(&cli)?;

    tracing::info!(
        inserts = config.inserts,
        point_queries = config.point_queries,
        updates = config.updates,
        selection = %config.selection,
        "generating workload"
    );

    let summary = if cli.output == Path::new("-") {
        generate(&config, BufWriter::new(io::stdout().lock()))?
    } else {
        let file = File::create(&cli.output)
            .with_context(|| format!("Failed to create workload file: {}", cli.output.display()))?;
        generate(&config, BufWriter::new(file))
            .with_context(|| format!("Failed to write workload file: {}", cli.output.display()))?
    };

    tracing::info!(
        records = %format_number(summary.total()),
        bytes = %format_number(summary.bytes_written),
        "workload written"
    );
    Ok(())
}
