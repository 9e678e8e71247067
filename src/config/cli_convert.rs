//! CLI to Config conversion utilities

use crate::config::cli::{Cli, DistributionType, GenCli};
use crate::config::toml::parse_generator_file;
use crate::config::workload::{GeneratorConfig, KeyDistribution};
use crate::config::ReplayConfig;
use anyhow::{Context, Result};

/// Parse a size string (e.g., "1k", "128", "4m") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with('k') || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches('k'), 1024u64)
    } else if s.ends_with('m') || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches('m'), 1024 * 1024)
    } else if s.ends_with('b') {
        (s.trim_end_matches('b'), 1)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size out of range: {}", s))
}

/// Build the replay configuration from CLI arguments
pub fn build_replay_config(cli: &Cli) -> ReplayConfig {
    let has_reports = cli.stats_file.is_some() && cli.latency_file.is_some();
    let measurement_enabled = has_reports && !cli.no_measure;

    ReplayConfig {
        store_options_path: cli.store_options.clone(),
        workload_path: cli.workload.clone(),
        stats_path: cli.stats_file.clone().filter(|_| measurement_enabled),
        latency_path: cli.latency_file.clone().filter(|_| measurement_enabled),
        db_path: cli.db_path.clone(),
        measurement_enabled,
        keep_db: cli.keep_db,
    }
}

/// Convert CLI distribution selection to the config type
pub fn convert_distribution(cli: &GenCli, dist: DistributionType) -> KeyDistribution {
    match dist {
        DistributionType::Uniform => KeyDistribution::Uniform,
        DistributionType::Zipf => KeyDistribution::Zipf {
            theta: cli.zipf_theta,
        },
        DistributionType::Beta => KeyDistribution::Beta {
            alpha: cli.beta_alpha,
            beta: cli.beta_beta,
        },
    }
}

/// Build the generator configuration: file first, then CLI overrides
pub fn build_generator_config(cli: &GenCli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => parse_generator_file(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(inserts) = cli.inserts {
        config.inserts = inserts;
    }
    if let Some(point_queries) = cli.point_queries {
        config.point_queries = point_queries;
    }
    if let Some(updates) = cli.updates {
        config.updates = updates;
    }
    if let Some(prefix) = &cli.key_prefix {
        config.key_prefix = prefix.clone();
    }
    if let Some(len) = &cli.value_len {
        config.value_len = parse_size(len).context("Invalid value length")? as usize;
    }
    if let Some(len) = &cli.update_value_len {
        config.update_value_len = parse_size(len).context("Invalid update value length")? as usize;
    }
    if let Some(dist) = cli.distribution {
        config.selection = convert_distribution(cli, dist);
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    Ok(config)
}
