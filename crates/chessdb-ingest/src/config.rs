//! Runtime configuration, deserialised from `ingest.toml` and `CHESSDB_*`
//! environment variables.

use std::{num::NonZeroUsize, path::PathBuf, thread::available_parallelism};

use chessdb_core::store::TableNames;
use serde::Deserialize;

// ─── Top level ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
  /// SQLite database file; a leading `~/` is expanded by the binary.
  pub store_path:         PathBuf,
  pub tables:             TableNames,
  pub pool:               PoolConfig,
  pub loader:             LoaderConfig,
  pub unresolved_players: UnresolvedPlayerPolicy,
  /// Abort a run that takes longer than this.
  pub deadline_secs:      Option<u64>,
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self {
      store_path:         PathBuf::from("chess.db"),
      tables:             TableNames::default(),
      pool:               PoolConfig::default(),
      loader:             LoaderConfig::default(),
      unresolved_players: UnresolvedPlayerPolicy::default(),
      deadline_secs:      None,
    }
  }
}

// ─── Worker pool ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
  /// Explicit worker count; wins over `core_fraction` when set.
  pub workers:       Option<usize>,
  /// Share of available cores to use when `workers` is unset.
  pub core_fraction: f64,
  /// Records per transform chunk.
  pub chunk_size:    usize,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      workers:       None,
      core_fraction: 0.8,
      chunk_size:    10_000,
    }
  }
}

impl PoolConfig {
  /// Number of worker threads, never less than one.
  pub fn worker_count(&self) -> usize {
    if let Some(n) = self.workers {
      return n.max(1);
    }
    let cores = available_parallelism().map(NonZeroUsize::get).unwrap_or(1);
    workers_for(cores, self.core_fraction)
  }
}

fn workers_for(cores: usize, fraction: f64) -> usize {
  let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
  ((cores as f64 * fraction).floor() as usize).max(1)
}

// ─── Bulk loader ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
  /// Rows per insert transaction.
  pub batch_size:  usize,
  /// Batches in flight at once; defaults to the worker count.
  pub concurrency: Option<usize>,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self {
      batch_size:  1_000,
      concurrency: None,
    }
  }
}

// ─── Policies ─────────────────────────────────────────────────────────────────

/// What to do with a game whose player name has no id in the refreshed map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPlayerPolicy {
  /// Keep the game and leave that side's foreign key null.
  #[default]
  KeepNull,
  /// Skip the game entirely.
  Drop,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn eighty_percent_of_cores_with_floor_of_one() {
    assert_eq!(workers_for(10, 0.8), 8);
    assert_eq!(workers_for(4, 0.8), 3);
    assert_eq!(workers_for(1, 0.8), 1);
    assert_eq!(workers_for(16, 0.0), 1);
    assert_eq!(workers_for(8, 7.0), 8);
    assert_eq!(workers_for(8, f64::NAN), 1);
  }

  #[test]
  fn explicit_worker_count_wins() {
    let cfg = PoolConfig { workers: Some(3), ..PoolConfig::default() };
    assert_eq!(cfg.worker_count(), 3);
    let cfg = PoolConfig { workers: Some(0), ..PoolConfig::default() };
    assert_eq!(cfg.worker_count(), 1);
  }
}
