//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// kvreplay - replay a workload log against a key-value store and report latencies
#[derive(Parser, Debug)]
#[command(name = "kvreplay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Store options file (TOML)
    #[arg(value_name = "STORE_OPTIONS")]
    pub store_options: PathBuf,

    /// Workload file, one operation per line
    #[arg(value_name = "WORKLOAD")]
    pub workload: PathBuf,

    /// Percentile summary output; giving both report files enables measurement
    #[arg(value_name = "STATS_FILE", requires = "latency_file")]
    pub stats_file: Option<PathBuf>,

    /// Raw per-operation latency output (JSON)
    #[arg(value_name = "LATENCY_FILE")]
    pub latency_file: Option<PathBuf>,

    /// Database directory
    #[arg(long, default_value = "./db", env = "KVREPLAY_DB_PATH")]
    pub db_path: PathBuf,

    /// Leave the database on disk instead of destroying it after the run
    #[arg(long)]
    pub keep_db: bool,

    /// Do not record latencies even if report files are given
    #[arg(long)]
    pub no_measure: bool,

    /// Skip the console summary
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Key selection distribution for generated workloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DistributionType {
    Uniform,
    Zipf,
    Beta,
}

/// kvreplay-gen - write a synthetic workload file
#[derive(Parser, Debug)]
#[command(name = "kvreplay-gen")]
#[command(version, about, long_about = None)]
pub struct GenCli {
    /// Output workload file ("-" for stdout)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Generator definition (TOML); flags below override it
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Inserts in the load phase
    #[arg(long)]
    pub inserts: Option<u64>,

    /// Point queries in the mixed phase
    #[arg(long)]
    pub point_queries: Option<u64>,

    /// Updates in the mixed phase
    #[arg(long)]
    pub updates: Option<u64>,

    /// Key prefix
    #[arg(long)]
    pub key_prefix: Option<String>,

    /// Insert value size (e.g., 1090, 1k)
    #[arg(long)]
    pub value_len: Option<String>,

    /// Update value size (e.g., 128, 4k)
    #[arg(long)]
    pub update_value_len: Option<String>,

    /// Key selection distribution for the mixed phase
    #[arg(long, value_enum)]
    pub distribution: Option<DistributionType>,

    /// Zipf theta parameter (0.0-3.0)
    #[arg(long, default_value = "1.2")]
    pub zipf_theta: f64,

    /// Beta distribution alpha
    #[arg(long, default_value = "0.2")]
    pub beta_alpha: f64,

    /// Beta distribution beta
    #[arg(long, default_value = "0.6")]
    pub beta_beta: f64,

    /// RNG seed for reproducible workloads
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GenCli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_minimal_args() {
        let cli = Cli::try_parse_from(["kvreplay", "opts.toml", "workload.txt"]).unwrap();
        assert_eq!(cli.store_options, PathBuf::from("opts.toml"));
        assert_eq!(cli.workload, PathBuf::from("workload.txt"));
        assert!(cli.stats_file.is_none());
        assert!(cli.latency_file.is_none());
        assert!(!cli.keep_db);
    }

    #[test]
    fn test_cli_report_files() {
        let cli = Cli::try_parse_from([
            "kvreplay",
            "opts.toml",
            "workload.txt",
            "stats.txt",
            "latency.json",
        ])
        .unwrap();
        assert_eq!(cli.stats_file, Some(PathBuf::from("stats.txt")));
        assert_eq!(cli.latency_file, Some(PathBuf::from("latency.json")));
    }

    #[test]
    fn test_cli_missing_required_args() {
        assert!(Cli::try_parse_from(["kvreplay"]).is_err());
        assert!(Cli::try_parse_from(["kvreplay", "opts.toml"]).is_err());
    }

    #[test]
    fn test_cli_stats_without_latency_file() {
        assert!(Cli::try_parse_from(["kvreplay", "opts.toml", "w.txt", "stats.txt"]).is_err());
    }

    #[test]
    fn test_gen_cli() {
        let cli = GenCli::try_parse_from([
            "kvreplay-gen",
            "out.txt",
            "--inserts",
            "10",
            "--distribution",
            "zipf",
        ])
        .unwrap();
        assert_eq!(cli.inserts, Some(10));
        assert_eq!(cli.distribution, Some(DistributionType::Zipf));
        assert_eq!(cli.zipf_theta, 1.2);
    }
}
