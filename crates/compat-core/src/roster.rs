//! Roster projections — read-only views that join season membership, the
//! base record and its ratings.
//!
//! The store supplies flat rows; the functions here fold them into one view
//! per subject. When the rows span several seasons (no season filter), the
//! lowest season number labels the view, supplies the partner, and wins any
//! rating type rated in more than one season.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  person::{Person, PersonId, PersonSummary},
  rating::{RatingRow, RatingType, RatingsByType},
  relationship::{Relationship, SeasonLink},
  score::{ScoreBreakdown, compute_score},
  season::SeasonNum,
};

// ─── Views ───────────────────────────────────────────────────────────────────

/// A person on a season roster, with their partner for that season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonView {
  #[serde(flatten)]
  pub person:            Person,
  pub season:            SeasonNum,
  pub partner_person_id: Option<PersonId>,
}

/// A person on a season roster, with their sparse ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRatingView {
  #[serde(flatten)]
  pub person:  Person,
  pub season:  SeasonNum,
  pub ratings: RatingsByType,
}

/// A relationship on a season roster, with both people's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipView {
  #[serde(flatten)]
  pub relationship: Relationship,
  pub season:       SeasonNum,
  pub person_1:     PersonSummary,
  pub person_2:     PersonSummary,
}

impl RelationshipView {
  /// "First Last & First Last".
  pub fn couple_display_name(&self) -> String {
    format!("{} & {}", self.person_1.full_name(), self.person_2.full_name())
  }
}

/// A relationship on a season roster, with its sparse ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRatingView {
  #[serde(flatten)]
  pub view:    RelationshipView,
  pub ratings: RatingsByType,
}

/// Everything needed to score one couple: the relationship, both people,
/// and the rating types that interpret their ratings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDetails {
  pub relationship: RelationshipRatingView,
  pub person_1:     PersonRatingView,
  pub person_2:     PersonRatingView,
  pub rating_types: Vec<RatingType>,
}

/// Scores for a [`RelationshipDetails`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailScores {
  pub relationship: ScoreBreakdown,
  pub person_1:     ScoreBreakdown,
  pub person_2:     ScoreBreakdown,
}

impl RelationshipDetails {
  pub fn scores(&self) -> Result<DetailScores> {
    Ok(DetailScores {
      relationship: compute_score(&self.relationship.ratings, &self.rating_types)?,
      person_1:     compute_score(&self.person_1.ratings, &self.rating_types)?,
      person_2:     compute_score(&self.person_2.ratings, &self.rating_types)?,
    })
  }
}

// ─── Input rows ──────────────────────────────────────────────────────────────

/// One `(person, season)` membership joined with the person record.
#[derive(Debug, Clone)]
pub struct MembershipRow {
  pub person: Person,
  pub season: SeasonNum,
}

/// One `(relationship, season)` link joined with both people.
#[derive(Debug, Clone)]
pub struct RelationshipRow {
  pub relationship: Relationship,
  pub season:       SeasonNum,
  pub person_1:     PersonSummary,
  pub person_2:     PersonSummary,
}

// ─── Partner index ───────────────────────────────────────────────────────────

/// Symmetric `(person, season) → partner` lookup built from season links.
///
/// Every link is entered from both sides, so a lookup from either member of
/// a pair yields the other. If a person has several links in one season the
/// lowest relationship id wins.
#[derive(Debug, Default)]
pub struct PartnerIndex {
  map: HashMap<(PersonId, SeasonNum), PersonId>,
}

impl PartnerIndex {
  pub fn from_links(links: &[SeasonLink]) -> Self {
    let mut ordered: Vec<&SeasonLink> = links.iter().collect();
    ordered.sort_by_key(|l| (l.relationship_id, l.season));

    let mut map = HashMap::new();
    for link in ordered {
      for member in [link.person_id_1, link.person_id_2] {
        if let Some(partner) = link.partner_of(member) {
          map.entry((member, link.season)).or_insert(partner);
        }
      }
    }
    Self { map }
  }

  pub fn partner(&self, person_id: PersonId, season: SeasonNum) -> Option<PersonId> {
    self.map.get(&(person_id, season)).copied()
  }
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Group rating rows by subject id. For each rating type the value from the
/// lowest season is kept.
pub fn group_ratings(rows: &[RatingRow]) -> HashMap<i64, RatingsByType> {
  let mut ordered: Vec<&RatingRow> = rows.iter().collect();
  ordered.sort_by_key(|r| (r.subject_id, r.season, r.rating_type_id));

  let mut grouped: HashMap<i64, RatingsByType> = HashMap::new();
  for row in ordered {
    grouped
      .entry(row.subject_id)
      .or_default()
      .entry(row.rating_type_id)
      .or_insert(Some(row.value));
  }
  grouped
}

/// Reduce rows to one per subject, keeping the lowest season. Output is
/// ordered by subject id.
fn lowest_season_per_subject<T>(
  rows: Vec<T>,
  key: impl Fn(&T) -> (i64, SeasonNum),
) -> Vec<T> {
  let mut by_subject: BTreeMap<i64, T> = BTreeMap::new();
  for row in rows {
    let (id, season) = key(&row);
    let keep_existing = by_subject
      .get(&id)
      .is_some_and(|kept| key(kept).1 <= season);
    if !keep_existing {
      by_subject.insert(id, row);
    }
  }
  by_subject.into_values().collect()
}

pub fn build_people(
  memberships: Vec<MembershipRow>,
  links: &[SeasonLink],
) -> Vec<PersonView> {
  let partners = PartnerIndex::from_links(links);
  lowest_season_per_subject(memberships, |m| (m.person.person_id, m.season))
    .into_iter()
    .map(|m| {
      let partner_person_id = partners.partner(m.person.person_id, m.season);
      PersonView { person: m.person, season: m.season, partner_person_id }
    })
    .collect()
}

pub fn build_people_with_ratings(
  memberships: Vec<MembershipRow>,
  ratings: &[RatingRow],
) -> Vec<PersonRatingView> {
  let mut grouped = group_ratings(ratings);
  lowest_season_per_subject(memberships, |m| (m.person.person_id, m.season))
    .into_iter()
    .map(|m| {
      let ratings = grouped.remove(&m.person.person_id).unwrap_or_default();
      PersonRatingView { person: m.person, season: m.season, ratings }
    })
    .collect()
}

pub fn build_relationships(rows: Vec<RelationshipRow>) -> Vec<RelationshipView> {
  lowest_season_per_subject(rows, |r| (r.relationship.relationship_id, r.season))
    .into_iter()
    .map(|r| RelationshipView {
      relationship: r.relationship,
      season:       r.season,
      person_1:     r.person_1,
      person_2:     r.person_2,
    })
    .collect()
}

pub fn build_relationships_with_ratings(
  rows: Vec<RelationshipRow>,
  ratings: &[RatingRow],
) -> Vec<RelationshipRatingView> {
  let mut grouped = group_ratings(ratings);
  build_relationships(rows)
    .into_iter()
    .map(|view| {
      let ratings = grouped
        .remove(&view.relationship.relationship_id)
        .unwrap_or_default();
      RelationshipRatingView { view, ratings }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use rust_decimal::Decimal;

  use super::*;
  use crate::{person::NewPerson, relationship::DEFAULT_RELATIONSHIP_TYPE};

  fn person(id: PersonId, first: &str) -> Person {
    let dob = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    Person::from_new(id, NewPerson::new(first, "Doe", dob))
  }

  fn member(id: PersonId, season: SeasonNum) -> MembershipRow {
    MembershipRow { person: person(id, "P"), season }
  }

  fn link(rel: i64, season: SeasonNum, p1: PersonId, p2: PersonId) -> SeasonLink {
    SeasonLink { season, relationship_id: rel, person_id_1: p1, person_id_2: p2 }
  }

  fn rating(subject: i64, season: SeasonNum, rt: i64, v: i64) -> RatingRow {
    RatingRow {
      subject_id:     subject,
      season,
      rating_type_id: rt,
      value:          Decimal::from(v),
    }
  }

  fn rel_row(rel: i64, season: SeasonNum) -> RelationshipRow {
    let a = person(1, "Ann");
    let b = person(2, "Bo");
    RelationshipRow {
      relationship: Relationship {
        relationship_id:   rel,
        person_id_1:       1,
        person_id_2:       2,
        relationship_type: DEFAULT_RELATIONSHIP_TYPE.into(),
        image_path:        String::new(),
      },
      season,
      person_1: PersonSummary::from(&a),
      person_2: PersonSummary::from(&b),
    }
  }

  #[test]
  fn partner_index_is_symmetric_per_season() {
    let index = PartnerIndex::from_links(&[link(1, 3, 10, 20)]);
    assert_eq!(index.partner(10, 3), Some(20));
    assert_eq!(index.partner(20, 3), Some(10));
    assert_eq!(index.partner(10, 4), None);
  }

  #[test]
  fn partner_index_prefers_lowest_relationship_id() {
    let index =
      PartnerIndex::from_links(&[link(9, 1, 10, 30), link(2, 1, 10, 20)]);
    assert_eq!(index.partner(10, 1), Some(20));
    assert_eq!(index.partner(30, 1), Some(10));
  }

  #[test]
  fn people_report_partner_for_their_season() {
    let views = build_people(
      vec![member(10, 3), member(20, 3), member(30, 3)],
      &[link(1, 3, 10, 20)],
    );
    assert_eq!(views.len(), 3);
    assert_eq!(views[0].partner_person_id, Some(20));
    assert_eq!(views[1].partner_person_id, Some(10));
    assert_eq!(views[2].partner_person_id, None);
  }

  // Order-sensitive: a person spanning several seasons is labelled with the
  // lowest season no matter which membership row arrives first.
  #[test]
  fn multi_season_label_uses_lowest_season_regardless_of_row_order() {
    let links = [link(1, 2, 10, 20), link(5, 4, 10, 30)];

    let ascending = build_people(vec![member(10, 2), member(10, 4)], &links);
    let descending = build_people(vec![member(10, 4), member(10, 2)], &links);

    assert_eq!(ascending, descending);
    assert_eq!(ascending.len(), 1);
    assert_eq!(ascending[0].season, 2);
    assert_eq!(ascending[0].partner_person_id, Some(20));
  }

  #[test]
  fn ratings_grouped_by_subject_with_lowest_season_winning() {
    let grouped = group_ratings(&[
      rating(10, 5, 1, 3),
      rating(10, 2, 1, 7),
      rating(10, 5, 2, 4),
      rating(20, 2, 1, 9),
    ]);
    let ten = &grouped[&10];
    assert_eq!(ten.get(&1), Some(&Some(Decimal::from(7))));
    assert_eq!(ten.get(&2), Some(&Some(Decimal::from(4))));
    assert_eq!(grouped[&20].len(), 1);
  }

  #[test]
  fn unrated_people_get_empty_mapping() {
    let views = build_people_with_ratings(
      vec![member(10, 1), member(20, 1)],
      &[rating(10, 1, 1, 8)],
    );
    assert_eq!(views[0].ratings.len(), 1);
    assert!(views[1].ratings.is_empty());
  }

  #[test]
  fn relationships_reported_once_across_seasons() {
    let views = build_relationships_with_ratings(
      vec![rel_row(1, 6), rel_row(1, 4)],
      &[rating(1, 4, 1, 5)],
    );
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].view.season, 4);
    assert_eq!(views[0].view.couple_display_name(), "Ann Doe & Bo Doe");
    assert_eq!(views[0].ratings.get(&1), Some(&Some(Decimal::from(5))));
  }

  #[test]
  fn details_score_every_party() {
    let rating_types = vec![RatingType {
      rating_type_id: 1,
      name:           "Chemistry".into(),
      weight:         Decimal::from(2),
      category:       "couple".into(),
    }];
    let relationship = build_relationships_with_ratings(
      vec![rel_row(1, 1)],
      &[rating(1, 1, 1, 6)],
    )
    .remove(0);
    let mut people =
      build_people_with_ratings(vec![member(1, 1), member(2, 1)], &[]);
    let person_2 = people.remove(1);
    let person_1 = people.remove(0);

    let details = RelationshipDetails { relationship, person_1, person_2, rating_types };
    let scores = details.scores().unwrap();
    assert_eq!(scores.relationship.score, Some(Decimal::from(6)));
    assert_eq!(scores.person_1.score, None);
    assert_eq!(scores.person_2.score, None);
  }
}
