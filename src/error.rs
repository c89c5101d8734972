//! Error taxonomy shared across the data layer.
//!
//! The error type is `Clone` on purpose: a single-flight fetch resolves once
//! and its result (value or error) is handed to every reader that joined the
//! in-flight request.

/// Errors surfaced by the remote source, cache, store and worker.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
  /// Requested entity id does not exist in the remote source.
  #[error("{resource} not found: {id}")]
  NotFound { resource: &'static str, id: String },

  /// The remote source rejected a malformed payload.
  #[error("validation failed: {0}")]
  Validation(String),

  /// Wrong email/password pair.
  #[error("invalid credentials")]
  InvalidCredentials,

  /// An operation that needs a session was called without one.
  #[error("not authenticated")]
  NotAuthenticated,

  /// The background pipeline computation failed.
  #[error("worker error: {0}")]
  Worker(String),

  /// Preference persistence failed (unreadable or unwritable storage).
  #[error("preference storage: {0}")]
  Storage(String),

  /// A cache key was read with a value type it was never written with.
  #[error("cache entry for {key} does not hold a {expected}")]
  TypeMismatch {
    key: String,
    expected: &'static str,
  },
}

impl Error {
  pub(crate) fn not_found(resource: &'static str, id: &str) -> Self {
    Error::NotFound {
      resource,
      id: id.to_string(),
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
