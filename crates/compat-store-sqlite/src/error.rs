//! Error type for `compat-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Validation and not-found errors. These are never wrapped in
  /// [`Error::TransactionFailure`].
  #[error(transparent)]
  Core(#[from] compat_core::Error),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  /// A uniqueness or integrity constraint rejected a write.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  /// A multi-step mutation failed part-way; the transaction was rolled back.
  #[error("transaction {operation} rolled back: {source}")]
  TransactionFailure {
    operation: &'static str,
    #[source]
    source:    Box<Error>,
  },

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("date parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Classify a failure of a transactional closure. Domain errors and
  /// constraint violations pass through; anything else means the
  /// transaction was rolled back.
  pub(crate) fn in_transaction(
    operation: &'static str,
    err: tokio_rusqlite::Error,
  ) -> Self {
    match Self::from(err) {
      kept @ (Self::Core(_) | Self::ConstraintViolation(_)) => kept,
      other => Self::TransactionFailure { operation, source: Box::new(other) },
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Core(e) if e.is_not_found())
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      // Domain errors raised inside a closure via `abort`.
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
        Ok(own) => *own,
        Err(inner) => Self::Database(tokio_rusqlite::Error::Other(inner)),
      },
      tokio_rusqlite::Error::Rusqlite(e) if is_constraint(&e) => {
        Self::ConstraintViolation(e.to_string())
      }
      other => Self::Database(other),
    }
  }
}

/// Carry a domain error out of a `tokio_rusqlite` closure. Returning it
/// drops the open transaction, which rolls it back.
pub(crate) fn abort(err: impl Into<Error>) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err.into()))
}

pub(crate) fn is_constraint(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn in_transaction_keeps_domain_and_constraint_errors() {
    let err = Error::in_transaction(
      "set_partner",
      abort(Error::ConstraintViolation("pair index".into())),
    );
    assert!(matches!(err, Error::ConstraintViolation(_)));

    let err = Error::in_transaction(
      "set_partner",
      abort(compat_core::Error::PersonNotFound(3)),
    );
    assert!(matches!(err, Error::Core(compat_core::Error::PersonNotFound(3))));
  }

  #[test]
  fn in_transaction_wraps_other_failures() {
    let err = Error::in_transaction("delete_rating_type", tokio_rusqlite::Error::ConnectionClosed);
    assert!(matches!(
      err,
      Error::TransactionFailure { operation: "delete_rating_type", .. }
    ));
  }
}
