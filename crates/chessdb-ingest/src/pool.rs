//! Fork-join worker pool for the CPU-bound stages.
//!
//! Input is split into contiguous chunks; each chunk is handed to a worker
//! together with shared read-only lookup data and transformed without any
//! communication with other workers. Every call returns only after all
//! chunks have finished.

use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use crate::{Result, cancel::CancelToken, config::PoolConfig};

pub struct TransformPool {
  pool:       ThreadPool,
  workers:    usize,
  chunk_size: usize,
}

impl TransformPool {
  pub fn new(config: &PoolConfig) -> Result<Self> {
    let workers = config.worker_count();
    let pool = ThreadPoolBuilder::new()
      .num_threads(workers)
      .thread_name(|idx| format!("ingest-worker-{idx}"))
      .build()?;
    tracing::debug!(workers, chunk_size = config.chunk_size, "worker pool ready");
    Ok(Self {
      pool,
      workers,
      chunk_size: config.chunk_size.max(1),
    })
  }

  pub fn workers(&self) -> usize { self.workers }

  /// Apply `f` to each chunk of `items` and return one result per chunk.
  ///
  /// Results come back in chunk order, but callers must not depend on it:
  /// the contract is "all chunks done", nothing more. A cancelled token stops
  /// chunks that have not started yet and the whole call fails.
  pub fn run_chunks<T, R, F>(&self, items: &[T], cancel: &CancelToken, f: F) -> Result<Vec<R>>
  where
    T: Sync,
    R: Send,
    F: Fn(&[T]) -> R + Send + Sync,
  {
    self.pool.install(|| {
      items
        .par_chunks(self.chunk_size)
        .map(|chunk| {
          cancel.check()?;
          Ok(f(chunk))
        })
        .collect()
    })
  }

  /// Apply `f` to each item individually, one item per work unit.
  pub fn run_each<T, R, F>(&self, items: Vec<T>, cancel: &CancelToken, f: F) -> Result<Vec<R>>
  where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
  {
    self.pool.install(|| {
      items
        .into_par_iter()
        .map(|item| {
          cancel.check()?;
          Ok(f(item))
        })
        .collect()
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  fn pool(workers: usize, chunk_size: usize) -> TransformPool {
    TransformPool::new(&PoolConfig {
      workers: Some(workers),
      chunk_size,
      ..PoolConfig::default()
    })
    .unwrap()
  }

  #[test]
  fn chunks_cover_all_items() {
    let items: Vec<u32> = (0..1_003).collect();
    let sums = pool(3, 100)
      .run_chunks(&items, &CancelToken::new(), |c| c.iter().sum::<u32>())
      .unwrap();
    assert_eq!(sums.len(), 11);
    assert_eq!(sums.iter().sum::<u32>(), items.iter().sum::<u32>());
  }

  #[test]
  fn empty_input_yields_no_chunks() {
    let items: Vec<u32> = vec![];
    let out = pool(2, 10)
      .run_chunks(&items, &CancelToken::new(), |c| c.len())
      .unwrap();
    assert!(out.is_empty());
  }

  #[test]
  fn zero_chunk_size_is_clamped() {
    let out = pool(1, 0)
      .run_chunks(&[1, 2, 3], &CancelToken::new(), |c| c.len())
      .unwrap();
    assert_eq!(out, vec![1, 1, 1]);
  }

  #[test]
  fn cancelled_token_fails_the_call() {
    let token = CancelToken::new();
    token.cancel();
    let err = pool(2, 1)
      .run_chunks(&[1, 2, 3], &token, |c| c.len())
      .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
  }

  #[test]
  fn run_each_maps_every_item() {
    let mut out = pool(4, 1)
      .run_each(vec![1, 2, 3, 4], &CancelToken::new(), |x| x * 10)
      .unwrap();
    out.sort();
    assert_eq!(out, vec![10, 20, 30, 40]);
  }
}
