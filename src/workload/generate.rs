//! Synthetic workload generation
//!
//! Writes a load phase of inserts under unique random keys, then a mixed phase
//! where point queries and updates are interleaved at random. Mixed-phase
//! operations pick among the loaded keys through a [`Distribution`], where
//! index 0 is the first key inserted.
//!
//! ```text
//! I usertable:user4821907712634018822 Xk2v...
//! I usertable:user0093318240076215311 mQ0a...
//! P usertable:user4821907712634018822
//! U usertable:user0093318240076215311 7hTz...
//! ```

use super::OperationKind;
use crate::config::validator::validate_generator;
use crate::config::workload::GeneratorConfig;
use crate::distribution::{self, Distribution};
use crate::Result;
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashSet;
use std::io::Write;

/// Records written by one generator run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub inserts: u64,
    pub point_queries: u64,
    pub updates: u64,
    pub bytes_written: u64,
}

impl GenerateSummary {
    pub fn total(&self) -> u64 {
        self.inserts + self.point_queries + self.updates
    }
}

struct LineWriter<W> {
    out: W,
    line: Vec<u8>,
    bytes: u64,
}

impl<W: Write> LineWriter<W> {
    fn emit(
        &mut self,
        kind: OperationKind,
        key: &[u8],
        value_len: Option<usize>,
        rng: &mut Xoshiro256PlusPlus,
    ) -> std::io::Result<()> {
        self.line.clear();
        self.line.extend_from_slice(kind.opcode().as_bytes());
        self.line.push(b' ');
        self.line.extend_from_slice(key);
        if let Some(len) = value_len {
            self.line.push(b' ');
            self.line.extend((0..len).map(|_| rng.sample(Alphanumeric)));
        }
        self.line.push(b'\n');
        self.out.write_all(&self.line)?;
        self.bytes += self.line.len() as u64;
        Ok(())
    }
}

/// Write the workload described by `config` to `out`
pub fn generate<W: Write>(config: &GeneratorConfig, out: W) -> Result<GenerateSummary> {
    validate_generator(config)?;

    let mut rng = match config.seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_entropy(),
    };
    // Derived so key selection does not shift when value lengths change
    let selection_seed = config.seed.map(|seed| seed.wrapping_add(0x9E37_79B9_7F4A_7C15));
    let mut dist = distribution::build(&config.selection, selection_seed)?;

    let mut writer = LineWriter {
        out,
        line: Vec::new(),
        bytes: 0,
    };
    let mut summary = GenerateSummary::default();

    let keys = load_phase(config, &mut rng, &mut writer, &mut summary)?;
    mixed_phase(config, &mut rng, dist.as_mut(), &keys, &mut writer, &mut summary)?;

    writer.out.flush()?;
    summary.bytes_written = writer.bytes;
    tracing::debug!(
        inserts = summary.inserts,
        point_queries = summary.point_queries,
        updates = summary.updates,
        "generated workload"
    );
    Ok(summary)
}

fn load_phase<W: Write>(
    config: &GeneratorConfig,
    rng: &mut Xoshiro256PlusPlus,
    writer: &mut LineWriter<W>,
    summary: &mut GenerateSummary,
) -> Result<Vec<Vec<u8>>> {
    // key_digits <= 19 after validation, so the key space fits in a u64
    let space = 10u64.pow(config.key_digits as u32);
    let mut used = HashSet::with_capacity(config.inserts as usize);
    let mut keys = Vec::with_capacity(config.inserts as usize);

    while (keys.len() as u64) < config.inserts {
        let suffix = rng.gen_range(0..space);
        if !used.insert(suffix) {
            continue;
        }
        let key = format!("{}{:0width$}", config.key_prefix, suffix, width = config.key_digits);
        writer.emit(OperationKind::Insert, key.as_bytes(), Some(config.value_len), rng)?;
        keys.push(key.into_bytes());
        summary.inserts += 1;
    }

    Ok(keys)
}

fn mixed_phase<W: Write>(
    config: &GeneratorConfig,
    rng: &mut Xoshiro256PlusPlus,
    dist: &mut dyn Distribution,
    keys: &[Vec<u8>],
    writer: &mut LineWriter<W>,
    summary: &mut GenerateSummary,
) -> Result<()> {
    let mut queries_left = config.point_queries;
    let mut updates_left = config.updates;

    while queries_left + updates_left > 0 {
        // Proportional draw keeps the exact counts while mixing them evenly
        let query = rng.gen_range(0..queries_left + updates_left) < queries_left;
        let key = &keys[dist.next_index(keys.len() as u64) as usize];

        if query {
            writer.emit(OperationKind::PointQuery, key, None, rng)?;
            queries_left -= 1;
            summary.point_queries += 1;
        } else {
            writer.emit(OperationKind::Update, key, Some(config.update_value_len), rng)?;
            updates_left -= 1;
            summary.updates += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workload::KeyDistribution;
    use crate::workload::{OperationKind, WorkloadReader};
    use std::collections::HashSet;
    use std::io::Cursor;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            inserts: 50,
            point_queries: 30,
            updates: 20,
            key_prefix: "user".to_string(),
            key_digits: 6,
            value_len: 16,
            update_value_len: 8,
            selection: KeyDistribution::Zipf { theta: 1.1 },
            seed: Some(7),
        }
    }

    fn render(config: &GeneratorConfig) -> Vec<u8> {
        let mut out = Vec::new();
        generate(config, &mut out).unwrap();
        out
    }

    #[test]
    fn test_generated_workload_parses_back() {
        let config = small_config();
        let out = render(&config);

        let ops: Vec<_> = WorkloadReader::new(Cursor::new(out))
            .map(|op| op.unwrap())
            .collect();
        assert_eq!(ops.len(), 100);

        let (load, mixed) = ops.split_at(50);
        assert!(load.iter().all(|op| op.kind == OperationKind::Insert));
        assert!(load.iter().all(|op| op.key.len() == "user".len() + 6));
        assert!(load.iter().all(|op| op.value().map(<[u8]>::len) == Some(16)));

        let loaded: HashSet<_> = load.iter().map(|op| op.key.clone()).collect();
        assert_eq!(loaded.len(), 50);
        assert!(mixed.iter().all(|op| loaded.contains(&op.key)));

        let queries = mixed.iter().filter(|op| op.kind == OperationKind::PointQuery).count();
        let updates = mixed.iter().filter(|op| op.kind == OperationKind::Update).count();
        assert_eq!((queries, updates), (30, 20));
        assert!(mixed
            .iter()
            .filter(|op| op.kind == OperationKind::Update)
            .all(|op| op.value().map(<[u8]>::len) == Some(8)));
    }

    #[test]
    fn test_seed_makes_output_reproducible() {
        let config = small_config();
        assert_eq!(render(&config), render(&config));

        let other = GeneratorConfig {
            seed: Some(8),
            ..small_config()
        };
        assert_ne!(render(&config), render(&other));
    }

    #[test]
    fn test_summary_counts() {
        let mut out = Vec::new();
        let summary = generate(&small_config(), &mut out).unwrap();
        assert_eq!(summary.inserts, 50);
        assert_eq!(summary.point_queries, 30);
        assert_eq!(summary.updates, 20);
        assert_eq!(summary.total(), 100);
        assert_eq!(summary.bytes_written, out.len() as u64);
    }

    #[test]
    fn test_load_only() {
        let config = GeneratorConfig {
            point_queries: 0,
            updates: 0,
            ..small_config()
        };
        let out = render(&config);
        assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 50);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            inserts: 0,
            ..small_config()
        };
        assert!(generate(&config, Vec::new()).is_err());
    }
}
