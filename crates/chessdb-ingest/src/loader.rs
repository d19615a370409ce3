//! Bulk loader: batched insert-if-absent writes with partial-success
//! semantics.
//!
//! Rows are cut into fixed-size batches and written concurrently, one store
//! transaction per batch. A failed batch is rolled back by the store, logged
//! and counted; it does not affect batches that already committed or are
//! still to run.

use std::sync::Arc;

use chessdb_core::{
  row::{Row, ToRow},
  store::IngestStore,
};
use tokio::{sync::Semaphore, task::JoinSet};

use crate::{Result, cancel::CancelToken};

// ─── Report ───────────────────────────────────────────────────────────────────

/// Outcome of loading one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
  /// Rows handed to the loader.
  pub rows:           usize,
  pub batches:        usize,
  pub failed_batches: usize,
  /// Rows the store accepted; duplicates are not counted.
  pub inserted:       u64,
}

impl LoadReport {
  pub fn is_success(&self) -> bool { self.failed_batches == 0 }
}

enum BatchOutcome {
  Committed(u64),
  Failed,
}

// ─── Loader ───────────────────────────────────────────────────────────────────

pub struct BulkLoader<S> {
  store:       Arc<S>,
  batch_size:  usize,
  concurrency: usize,
}

impl<S> BulkLoader<S>
where
  S: IngestStore + 'static,
{
  pub fn new(store: Arc<S>, batch_size: usize, concurrency: usize) -> Self {
    Self {
      store,
      batch_size: batch_size.max(1),
      concurrency: concurrency.max(1),
    }
  }

  /// Flatten `items` and load them into `table`.
  pub async fn load<T: ToRow>(
    &self,
    table:  &str,
    items:  &[T],
    cancel: &CancelToken,
  ) -> Result<LoadReport> {
    let rows = items.iter().map(ToRow::to_row).collect();
    self.load_rows(table, T::COLUMNS, rows, cancel).await
  }

  /// Load pre-built rows. The loader knows nothing about `table`; row shape
  /// is checked only by the store.
  ///
  /// Returns `Err` only when `cancel` fires; unfinished batches are aborted.
  pub async fn load_rows(
    &self,
    table:   &str,
    columns: &'static [&'static str],
    rows:    Vec<Row>,
    cancel:  &CancelToken,
  ) -> Result<LoadReport> {
    let mut report = LoadReport {
      rows: rows.len(),
      ..LoadReport::default()
    };
    if rows.is_empty() {
      return Ok(report);
    }

    let table: Arc<str> = Arc::from(table);
    let permits = Arc::new(Semaphore::new(self.concurrency));
    let mut tasks = JoinSet::new();

    let mut remaining = rows.into_iter();
    loop {
      let batch: Vec<Row> = remaining.by_ref().take(self.batch_size).collect();
      if batch.is_empty() {
        break;
      }
      if let Err(e) = cancel.check() {
        tasks.shutdown().await;
        return Err(e);
      }

      let index = report.batches;
      report.batches += 1;

      let store = Arc::clone(&self.store);
      let table = Arc::clone(&table);
      let permits = Arc::clone(&permits);
      tasks.spawn(async move {
        let _permit = permits.acquire_owned().await;
        let len = batch.len();
        match store.insert_ignore_duplicates(&table, columns, batch).await {
          Ok(inserted) => {
            tracing::debug!(%table, batch = index, rows = len, inserted, "batch loaded");
            BatchOutcome::Committed(inserted)
          }
          Err(e) => {
            tracing::error!(%table, batch = index, rows = len, "batch rolled back: {e}");
            BatchOutcome::Failed
          }
        }
      });
    }

    while let Some(joined) = tasks.join_next().await {
      match joined {
        Ok(BatchOutcome::Committed(n)) => report.inserted += n,
        Ok(BatchOutcome::Failed) => report.failed_batches += 1,
        Err(e) => {
          tracing::error!(%table, "batch task aborted: {e}");
          report.failed_batches += 1;
        }
      }
      if !tasks.is_empty()
        && let Err(e) = cancel.check()
      {
        tasks.shutdown().await;
        return Err(e);
      }
    }

    tracing::info!(
      %table,
      rows = report.rows,
      inserted = report.inserted,
      failed_batches = report.failed_batches,
      "table loaded"
    );
    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chessdb_core::row::Value;

  use super::*;
  use crate::Error;

  /// In-memory store that rejects any batch containing a poisoned value and
  /// otherwise keeps unique first-column values.
  #[derive(Default)]
  struct MemStore {
    rows: Mutex<Vec<Row>>,
  }

  #[derive(Debug, thiserror::Error)]
  #[error("poisoned batch")]
  struct Poisoned;

  impl IngestStore for MemStore {
    type Error = Poisoned;

    async fn fetch<'a>(&'a self, _: &'a str, _: &'a [&'a str]) -> Result<Vec<Row>, Poisoned> {
      Ok(self.rows.lock().unwrap().clone())
    }

    async fn insert_ignore_duplicates<'a>(
      &'a self,
      _: &'a str,
      _: &'a [&'a str],
      rows: Vec<Row>,
    ) -> Result<u64, Poisoned> {
      if rows.iter().any(|r| r[0] == Value::from("poison")) {
        return Err(Poisoned);
      }
      let mut stored = self.rows.lock().unwrap();
      let mut inserted = 0;
      for row in rows {
        if !stored.iter().any(|s| s[0] == row[0]) {
          stored.push(row);
          inserted += 1;
        }
      }
      Ok(inserted)
    }

    async fn refresh_max_elo<'a>(&'a self, _: &'a str, _: &'a str) -> Result<(), Poisoned> {
      Ok(())
    }
  }

  const COLUMNS: &[&str] = &["key"];

  fn rows(keys: &[&str]) -> Vec<Row> { keys.iter().map(|k| vec![Value::from(*k)]).collect() }

  #[tokio::test]
  async fn splits_into_batches() {
    let store = Arc::new(MemStore::default());
    let loader = BulkLoader::new(Arc::clone(&store), 2, 2);
    let report = loader
      .load_rows("t", COLUMNS, rows(&["a", "b", "c", "d", "e"]), &CancelToken::new())
      .await
      .unwrap();

    assert_eq!(report.batches, 3);
    assert_eq!(report.inserted, 5);
    assert!(report.is_success());
  }

  #[tokio::test]
  async fn duplicates_are_not_errors() {
    let store = Arc::new(MemStore::default());
    let loader = BulkLoader::new(Arc::clone(&store), 10, 1);
    let cancel = CancelToken::new();
    loader.load_rows("t", COLUMNS, rows(&["a", "b"]), &cancel).await.unwrap();
    let again = loader.load_rows("t", COLUMNS, rows(&["a", "b", "c"]), &cancel).await.unwrap();

    assert_eq!(again.inserted, 1);
    assert!(again.is_success());
    assert_eq!(store.rows.lock().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn failed_batch_leaves_siblings_committed() {
    let store = Arc::new(MemStore::default());
    let loader = BulkLoader::new(Arc::clone(&store), 2, 4);
    let report = loader
      .load_rows("t", COLUMNS, rows(&["a", "b", "poison", "c", "d", "e"]), &CancelToken::new())
      .await
      .unwrap();

    assert_eq!(report.batches, 3);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.inserted, 4);
    assert!(!report.is_success());
  }

  #[tokio::test]
  async fn cancelled_load_fails() {
    let store = Arc::new(MemStore::default());
    let loader = BulkLoader::new(Arc::clone(&store), 1, 1);
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = loader
      .load_rows("t", COLUMNS, rows(&["a", "b"]), &cancel)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(store.rows.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn empty_input_dispatches_nothing() {
    let loader = BulkLoader::new(Arc::new(MemStore::default()), 10, 1);
    let report = loader.load_rows("t", COLUMNS, vec![], &CancelToken::new()).await.unwrap();
    assert_eq!(report, LoadReport::default());
  }
}
