//! Error taxonomy for `karir-core`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed identifier, pagination parameter or request body.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// The record does not exist, is not in the required lifecycle state, or
  /// is not owned by the caller. The three causes are never distinguished.
  #[error("record not found or not accessible")]
  NotFoundOrForbidden,

  /// A uniqueness or referential constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store operation timed out after {0:?}")]
  Timeout(Duration),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap an arbitrary backend error as [`Error::Store`].
  pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
