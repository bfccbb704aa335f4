//! Rating types and rating values.
//!
//! A rating is a decimal value keyed by `(subject, season, rating_type)`.
//! Rating types carry the weight used by [`crate::score::compute_score`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result, person::PersonId, relationship::RelationshipId,
  season::SeasonNum,
};

/// Store-assigned identity of a [`RatingType`].
pub type RatingTypeId = i64;

/// Sparse rating mapping for one subject. A missing key and a `None` value
/// both mean "not rated"; neither is the same as a zero rating.
pub type RatingsByType = BTreeMap<RatingTypeId, Option<Decimal>>;

/// A named, weighted rating criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingType {
  pub rating_type_id: RatingTypeId,
  pub name:           String,
  pub weight:         Decimal,
  pub category:       String,
}

impl RatingType {
  pub fn from_new(rating_type_id: RatingTypeId, input: NewRatingType) -> Self {
    Self {
      rating_type_id,
      name: input.name,
      weight: input.weight,
      category: input.category,
    }
  }
}

/// Input to [`crate::store::CompatStore::add_rating_type`] and
/// [`crate::store::CompatStore::update_rating_type`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRatingType {
  pub name:     String,
  pub weight:   Decimal,
  #[serde(default)]
  pub category: String,
}

/// The target of a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RatingSubject {
  Person(PersonId),
  Relationship(RelationshipId),
}

/// One stored rating value, as read back for roster assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingRow {
  /// Person or relationship id, depending on which table it came from.
  pub subject_id:     i64,
  pub season:         SeasonNum,
  pub rating_type_id: RatingTypeId,
  pub value:          Decimal,
}

/// Check the arguments of a rating upsert. Both the value and the season are
/// mandatory; an absent one is a caller error rather than a no-op.
pub fn require_rating_args(
  value: Option<Decimal>,
  season: Option<SeasonNum>,
) -> Result<(Decimal, SeasonNum)> {
  let season = season.ok_or_else(|| Error::missing("season"))?;
  let value = value.ok_or_else(|| Error::missing("rating value"))?;
  Ok((value, season))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn upsert_args_require_season_and_value() {
    let err = require_rating_args(Some(Decimal::ONE), None).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(m) if m.contains("season")));

    let err = require_rating_args(None, Some(3)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(m) if m.contains("value")));

    let (value, season) = require_rating_args(Some(Decimal::TEN), Some(3)).unwrap();
    assert_eq!((value, season), (Decimal::TEN, 3));
  }

  #[test]
  fn subject_serialises_with_kind_tag() {
    let json = serde_json::to_value(RatingSubject::Relationship(4)).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "relationship", "id": 4 }));
  }
}
