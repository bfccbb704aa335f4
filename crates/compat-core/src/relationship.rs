//! Relationships — unordered pairs of people that persist across seasons.
//!
//! A relationship is a single record per pair; the seasons it spans are
//! recorded as separate [`SeasonLink`]s. A relationship with no links is an
//! orphan and is removed by the store as soon as its last link goes away.

use serde::{Deserialize, Serialize};

use crate::{person::PersonId, season::SeasonNum};

/// Store-assigned identity of a [`Relationship`].
pub type RelationshipId = i64;

/// Type label given to relationships created by partner assignment.
pub const DEFAULT_RELATIONSHIP_TYPE: &str = "Fiance";

/// An unordered pair of people. `person_id_1` and `person_id_2` carry no
/// ordering meaning; `(a, b)` and `(b, a)` are the same relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
  pub relationship_id:   RelationshipId,
  pub person_id_1:       PersonId,
  pub person_id_2:       PersonId,
  pub relationship_type: String,
  pub image_path:        String,
}

/// A `(season, relationship)` row: the relationship is active in `season`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLink {
  pub season:          SeasonNum,
  pub relationship_id: RelationshipId,
  pub person_id_1:     PersonId,
  pub person_id_2:     PersonId,
}

impl SeasonLink {
  /// The other half of the pair, or `None` if `person_id` is not in it.
  pub fn partner_of(&self, person_id: PersonId) -> Option<PersonId> {
    if self.person_id_1 == person_id {
      Some(self.person_id_2)
    } else if self.person_id_2 == person_id {
      Some(self.person_id_1)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partner_is_symmetric() {
    let link = SeasonLink { season: 3, relationship_id: 7, person_id_1: 1, person_id_2: 2 };
    assert_eq!(link.partner_of(1), Some(2));
    assert_eq!(link.partner_of(2), Some(1));
    assert_eq!(link.partner_of(3), None);
  }
}
