//! Error types for `compat-core`.

use thiserror::Error;

use crate::{person::PersonId, rating::RatingTypeId, relationship::RelationshipId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(PersonId),

  #[error("relationship not found: {0}")]
  RelationshipNotFound(RelationshipId),

  #[error("rating type not found: {0}")]
  RatingTypeNotFound(RatingTypeId),

  /// A required parameter was absent. Raised before the store is touched.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// A weighted sum or quotient left the decimal range.
  #[error("score overflow: ratings or weights exceed the decimal range")]
  ScoreOverflow,
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::PersonNotFound(_)
        | Self::RelationshipNotFound(_)
        | Self::RatingTypeNotFound(_)
    )
  }

  pub(crate) fn missing(what: &str) -> Self {
    Self::InvalidArgument(format!("{what} is required"))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
