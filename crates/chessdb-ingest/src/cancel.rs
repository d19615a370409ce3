//! Cooperative cancellation shared by the worker pool and the bulk loader.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::{Duration, Instant},
};

use crate::{Error, Result};

/// A cancel flag plus an optional deadline.
///
/// Clones share the flag. Work units call [`check`](Self::check) before they
/// start; in-flight units run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
  flag:     Arc<AtomicBool>,
  deadline: Option<Instant>,
}

impl CancelToken {
  pub fn new() -> Self { Self::default() }

  /// A token that also expires `timeout` from now.
  pub fn with_timeout(timeout: Duration) -> Self {
    Self {
      flag:     Arc::default(),
      deadline: Instant::now().checked_add(timeout),
    }
  }

  pub fn cancel(&self) { self.flag.store(true, Ordering::Relaxed); }

  pub fn is_cancelled(&self) -> bool { self.flag.load(Ordering::Relaxed) }

  pub fn check(&self) -> Result<()> {
    if self.is_cancelled() {
      return Err(Error::Cancelled);
    }
    match self.deadline {
      Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded),
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cancel_is_shared_between_clones() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(token.check().is_ok());
    other.cancel();
    assert!(matches!(token.check(), Err(Error::Cancelled)));
  }

  #[test]
  fn expired_deadline_fails_check() {
    let token = CancelToken::with_timeout(Duration::ZERO);
    assert!(matches!(token.check(), Err(Error::DeadlineExceeded)));
  }
}
