//! TOML configuration file parsing

use super::workload::GeneratorConfig;
use super::StoreOptions;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse the store options file
pub fn parse_store_options_file(path: &Path) -> Result<StoreOptions> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read store options file: {}", path.display()))?;

    parse_store_options_string(&contents)
        .with_context(|| format!("Failed to parse store options file: {}", path.display()))
}

/// Parse store options from a string
pub fn parse_store_options_string(contents: &str) -> Result<StoreOptions> {
    let options: StoreOptions =
        ::toml::from_str(contents).context("Failed to parse TOML store options")?;

    Ok(options)
}

/// Parse a generator definition file
pub fn parse_generator_file(path: &Path) -> Result<GeneratorConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read generator file: {}", path.display()))?;

    let config: GeneratorConfig = ::toml::from_str(&contents)
        .with_context(|| format!("Failed to parse generator file: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workload::KeyDistribution;
    use crate::config::EngineType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_empty_options_uses_defaults() {
        let options = parse_store_options_string("").unwrap();
        assert_eq!(options, StoreOptions::default());
    }

    #[test]
    fn test_parse_store_options() {
        let options = parse_store_options_string(
            r#"
            engine = "log"

            [log]
            sync_writes = true
            write_buffer_size = 4096
            "#,
        )
        .unwrap();

        assert_eq!(options.engine, EngineType::Log);
        assert!(options.log.sync_writes);
        assert_eq!(options.log.write_buffer_size, 4096);
        assert!(options.log.create_if_missing);
    }

    #[test]
    fn test_parse_memory_engine() {
        let options = parse_store_options_string("engine = \"memory\"").unwrap();
        assert_eq!(options.engine, EngineType::Memory);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        assert!(parse_store_options_string("engine = \"rocks\"").is_err());
        assert!(parse_store_options_string("[log]\nblock_cache = 8").is_err());
    }

    #[test]
    fn test_missing_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_store_options_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read store options file"));
    }

    #[test]
    fn test_parse_generator_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            inserts = 100
            point_queries = 50
            updates = 50
            seed = 7

            [selection.beta]
            alpha = 0.2
            beta = 0.6
            "#
        )
        .unwrap();

        let config = parse_generator_file(file.path()).unwrap();
        assert_eq!(config.total_operations(), 200);
        assert_eq!(config.key_prefix, "usertable:user");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.selection, KeyDistribution::Beta { alpha: 0.2, beta: 0.6 });
    }
}
