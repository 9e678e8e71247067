//! Configuration validation

use super::workload::{GeneratorConfig, KeyDistribution};
use super::{ReplayConfig, StoreOptions};
use anyhow::Result;

/// Validate store options
pub fn validate_store_options(options: &StoreOptions) -> Result<()> {
    if options.log.write_buffer_size == 0 {
        anyhow::bail!("log.write_buffer_size must be greater than 0");
    }
    if options.log.error_if_exists && !options.log.create_if_missing {
        anyhow::bail!("log.error_if_exists requires log.create_if_missing");
    }
    Ok(())
}

/// Validate a replay run before anything is opened
pub fn validate_replay(config: &ReplayConfig) -> Result<()> {
    if config.measurement_enabled && config.stats_path.is_none() && config.latency_path.is_none() {
        anyhow::bail!("measurement is enabled but neither a stats file nor a latency file was given");
    }
    if let (Some(stats), Some(latency)) = (&config.stats_path, &config.latency_path) {
        if stats == latency {
            anyhow::bail!(
                "stats file and latency file must differ, both are {}",
                stats.display()
            );
        }
    }
    if config.db_path.as_os_str().is_empty() {
        anyhow::bail!("database path must not be empty");
    }
    Ok(())
}

/// Widest numeric key suffix that still fits in a u64
pub const MAX_KEY_DIGITS: usize = 19;

/// Validate a generator definition
pub fn validate_generator(config: &GeneratorConfig) -> Result<()> {
    if config.inserts == 0 && (config.point_queries > 0 || config.updates > 0) {
        anyhow::bail!("point queries and updates need at least one insert to select keys from");
    }
    if config.key_digits == 0 || config.key_digits > MAX_KEY_DIGITS {
        anyhow::bail!("key_digits must be between 1 and {}", MAX_KEY_DIGITS);
    }
    if let Some(space) = 10u64.checked_pow(config.key_digits as u32) {
        if config.inserts > space {
            anyhow::bail!(
                "{} inserts need unique keys but {} digits only allow {}",
                config.inserts,
                config.key_digits,
                space
            );
        }
    }
    if config.key_prefix.contains(' ') || config.key_prefix.contains('\n') {
        anyhow::bail!("key_prefix must not contain spaces or newlines");
    }

    match config.selection {
        KeyDistribution::Uniform => {}
        KeyDistribution::Zipf { theta } => {
            if !(0.0..=3.0).contains(&theta) {
                anyhow::bail!("zipf theta must be between 0.0 and 3.0, got {}", theta);
            }
        }
        KeyDistribution::Beta { alpha, beta } => {
            if !(alpha > 0.0 && alpha.is_finite()) || !(beta > 0.0 && beta.is_finite()) {
                anyhow::bail!(
                    "beta alpha and beta must be positive, got alpha={} beta={}",
                    alpha,
                    beta
                );
            }
        }
    }

    Ok(())
}
