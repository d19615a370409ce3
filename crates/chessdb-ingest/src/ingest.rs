//! Orchestrator: sequences the stages of one ingestion run.
//!
//! Per batch of archives:
//!
//! 1. parse every archive on the worker pool and merge the records;
//! 2. fetch known player names, extract the unknown ones and load them;
//! 3. refresh the player and opening maps from the store;
//! 4. build game rows from the refreshed maps and load them;
//! 5. ask the store to recompute `max_elo`.
//!
//! Each stage starts only after the previous one has fully completed. Games
//! are never built from a map fetched before the new players were written.

use std::{
  io::BufRead,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use chessdb_core::{
  record::RawGameRecord,
  store::{IngestStore, TableNames},
};
use chessdb_pgn::Records;

use crate::{
  Result,
  cancel::CancelToken,
  config::{IngestConfig, UnresolvedPlayerPolicy},
  extract::{candidates_in, into_players, merge_candidates},
  loader::{BulkLoader, LoadReport},
  openings::read_openings,
  pool::TransformPool,
  resolve::Resolver,
  transform::build_chunk,
};

// ─── Reports ──────────────────────────────────────────────────────────────────

/// Outcome of ingesting one batch of archives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
  /// Archive files in the batch.
  pub archives:         usize,
  /// Archives that could not be opened and were skipped.
  pub archives_missing: usize,
  /// Complete records parsed across all archives.
  pub records:          usize,
  /// Malformed tag lines skipped while parsing.
  pub tags_skipped:     usize,
  pub new_players:      usize,
  pub games_built:      usize,
  /// Records skipped under [`UnresolvedPlayerPolicy::Drop`].
  pub games_dropped:    usize,
  pub players:          LoadReport,
  pub games:            LoadReport,
}

impl IngestReport {
  /// `false` if any player or game batch failed to persist.
  pub fn is_success(&self) -> bool { self.players.is_success() && self.games.is_success() }
}

/// Outcome of [`Ingestor::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
  pub openings: LoadReport,
  pub batches:  Vec<IngestReport>,
}

impl RunReport {
  pub fn is_success(&self) -> bool {
    self.openings.is_success() && self.batches.iter().all(IngestReport::is_success)
  }

  pub fn failed_batches(&self) -> usize {
    self.openings.failed_batches
      + self
        .batches
        .iter()
        .map(|b| b.players.failed_batches + b.games.failed_batches)
        .sum::<usize>()
  }
}

// ─── Ingestor ─────────────────────────────────────────────────────────────────

pub struct Ingestor<S> {
  store:  Arc<S>,
  tables: TableNames,
  pool:   Arc<TransformPool>,
  loader: BulkLoader<S>,
  policy: UnresolvedPlayerPolicy,
  cancel: CancelToken,
}

impl<S> Ingestor<S>
where
  S: IngestStore + 'static,
{
  /// Build an ingestor over `store`. The deadline, if configured, starts
  /// counting now.
  pub fn new(store: Arc<S>, config: &IngestConfig) -> Result<Self> {
    let pool = TransformPool::new(&config.pool)?;
    let concurrency = config.loader.concurrency.unwrap_or(pool.workers());
    let loader = BulkLoader::new(Arc::clone(&store), config.loader.batch_size, concurrency);
    let cancel = match config.deadline_secs {
      Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
      None => CancelToken::new(),
    };

    Ok(Self {
      store,
      tables: config.tables.clone(),
      pool: Arc::new(pool),
      loader,
      policy: config.unresolved_players,
      cancel,
    })
  }

  /// Replace the cancellation token, e.g. to share one with a signal handler.
  pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn cancel_token(&self) -> &CancelToken { &self.cancel }

  pub fn store(&self) -> &S { &self.store }

  /// Read the opening tables and bulk-load them. Missing files are logged
  /// and skipped.
  pub async fn load_openings(&self, files: &[PathBuf]) -> Result<LoadReport> {
    self.cancel.check()?;
    let files = files.to_vec();
    let openings = tokio::task::spawn_blocking(move || read_openings(&files)).await?;
    self.loader.load(&self.tables.openings, &openings, &self.cancel).await
  }

  /// Ingest one batch of archives. All archives are parsed and merged before
  /// any player is extracted.
  pub async fn ingest(&self, archives: &[PathBuf]) -> Result<IngestReport> {
    self.cancel.check()?;
    let mut report = IngestReport {
      archives: archives.len(),
      ..IngestReport::default()
    };

    // Parse.
    let paths = archives.to_vec();
    let parsed = self
      .on_pool(move |pool, cancel| pool.run_each(paths, cancel, parse_archive))
      .await?;
    let mut records = Vec::new();
    for archive in parsed {
      match archive {
        Some(archive) => {
          report.tags_skipped += archive.tags_skipped;
          records.extend(archive.records);
        }
        None => report.archives_missing += 1,
      }
    }
    report.records = records.len();
    tracing::info!(
      archives = report.archives,
      missing = report.archives_missing,
      records = report.records,
      tags_skipped = report.tags_skipped,
      "archives parsed"
    );
    let records = Arc::new(records);

    // Extract and load new players.
    let resolver = Resolver::new(self.store.as_ref(), &self.tables);
    let known = Arc::new(resolver.players().await?);
    let chunks = {
      let records = Arc::clone(&records);
      self
        .on_pool(move |pool, cancel| {
          pool.run_chunks(records.as_slice(), cancel, |chunk| candidates_in(chunk, &known))
        })
        .await?
    };
    let players = into_players(merge_candidates(chunks));
    report.new_players = players.len();
    tracing::info!(new_players = report.new_players, "players extracted");
    report.players = self.loader.load(&self.tables.players, &players, &self.cancel).await?;

    // Re-read the maps so that players written above resolve.
    let maps = Arc::new(resolver.refresh().await?);

    // Build and load games.
    let policy = self.policy;
    let chunks = self
      .on_pool(move |pool, cancel| {
        pool.run_chunks(records.as_slice(), cancel, |chunk| build_chunk(chunk, &maps, policy))
      })
      .await?;
    let mut games = Vec::with_capacity(report.records);
    for chunk in chunks {
      report.games_dropped += chunk.dropped;
      games.extend(chunk.games);
    }
    report.games_built = games.len();
    tracing::info!(
      games = report.games_built,
      dropped = report.games_dropped,
      "games built"
    );
    report.games = self.loader.load(&self.tables.games, &games, &self.cancel).await?;

    if let Err(e) = self
      .store
      .refresh_max_elo(&self.tables.players, &self.tables.games)
      .await
    {
      tracing::error!("max_elo refresh failed: {e}");
    }

    Ok(report)
  }

  /// Load openings once, then ingest each batch in order.
  pub async fn run(&self, openings: &[PathBuf], batches: &[Vec<PathBuf>]) -> Result<RunReport> {
    let mut report = RunReport {
      openings: self.load_openings(openings).await?,
      batches:  Vec::with_capacity(batches.len()),
    };
    for (i, batch) in batches.iter().enumerate() {
      tracing::info!(batch = i, archives = batch.len(), "ingesting batch");
      report.batches.push(self.ingest(batch).await?);
    }
    Ok(report)
  }

  /// Run `f` on the worker pool without blocking the async runtime.
  async fn on_pool<R, F>(&self, f: F) -> Result<R>
  where
    R: Send + 'static,
    F: FnOnce(&TransformPool, &CancelToken) -> Result<R> + Send + 'static,
  {
    let pool = Arc::clone(&self.pool);
    let cancel = self.cancel.clone();
    tokio::task::spawn_blocking(move || f(&pool, &cancel)).await?
  }
}

/// Completed records of one archive plus the tag lines it had to skip.
struct ParsedArchive {
  records:      Vec<RawGameRecord>,
  tags_skipped: usize,
}

/// Parse one archive to completion. `None` if it cannot be opened; a read
/// error part way keeps the records completed before it.
fn parse_archive(path: PathBuf) -> Option<ParsedArchive> {
  let records = match chessdb_pgn::open(&path) {
    Ok(r) => r,
    Err(e) => {
      tracing::error!("{e}");
      return None;
    }
  };
  Some(collect_records(&path, records))
}

fn collect_records<R: BufRead>(path: &Path, mut records: Records<R>) -> ParsedArchive {
  let mut out = Vec::new();
  for record in records.by_ref() {
    match record {
      Ok(r) => out.push(r),
      Err(e) => {
        tracing::error!(file = ?path, "archive read aborted: {e}");
        break;
      }
    }
  }
  let tags_skipped = records.skipped_tags();
  tracing::debug!(file = ?path, records = out.len(), tags_skipped, "archive parsed");
  ParsedArchive { records: out, tags_skipped }
}
