//! Rating upserts and removals.
//!
//! Upserts enrol the subject in the season before writing the rating, so a
//! rating never references a season its subject is not part of. For a
//! relationship that means the season link plus both people's memberships.

use compat_core::{
  person::PersonId,
  rating::{RatingSubject, RatingTypeId},
  relationship::RelationshipId,
  season::SeasonNum,
};
use rusqlite::{Connection, TransactionBehavior};
use tracing::debug;

use crate::graph::{link_pair, require_person, require_rating_type, require_relationship};

pub fn upsert_person_rating(
  conn: &mut Connection,
  person_id: PersonId,
  rating_type_id: RatingTypeId,
  value: String,
  season: SeasonNum,
) -> tokio_rusqlite::Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  require_person(&tx, person_id)?;
  require_rating_type(&tx, rating_type_id)?;

  let enrolled = tx.execute(
    "INSERT OR IGNORE INTO person_seasons (person_id, season) VALUES (?1, ?2)",
    rusqlite::params![person_id, season],
  )?;
  tx.execute(
    "INSERT INTO person_ratings (person_id, season, rating_type_id, rating_value)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (person_id, season, rating_type_id)
     DO UPDATE SET rating_value = excluded.rating_value",
    rusqlite::params![person_id, season, rating_type_id, value],
  )?;

  tx.commit()?;
  debug!(person_id, season, rating_type_id, enrolled, "upserted person rating");
  Ok(())
}

pub fn upsert_relationship_rating(
  conn: &mut Connection,
  relationship_id: RelationshipId,
  rating_type_id: RatingTypeId,
  value: String,
  season: SeasonNum,
) -> tokio_rusqlite::Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let (person_id_1, person_id_2) = require_relationship(&tx, relationship_id)?;
  require_rating_type(&tx, rating_type_id)?;

  let enrolled = link_pair(&tx, relationship_id, person_id_1, person_id_2, season)?;
  tx.execute(
    "INSERT INTO relationship_ratings (relationship_id, season, rating_type_id, rating_value)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (relationship_id, season, rating_type_id)
     DO UPDATE SET rating_value = excluded.rating_value",
    rusqlite::params![relationship_id, season, rating_type_id, value],
  )?;

  tx.commit()?;
  debug!(relationship_id, season, rating_type_id, enrolled, "upserted relationship rating");
  Ok(())
}

/// Remove ratings of one type for a subject; every season when `season` is
/// `None`. Returns the number of rows removed.
pub fn remove_rating(
  conn: &Connection,
  subject: RatingSubject,
  rating_type_id: RatingTypeId,
  season: Option<SeasonNum>,
) -> rusqlite::Result<usize> {
  let (sql, subject_id) = match subject {
    RatingSubject::Person(id) => (
      "DELETE FROM person_ratings
       WHERE person_id = ?1 AND rating_type_id = ?2 AND (?3 IS NULL OR season = ?3)",
      id,
    ),
    RatingSubject::Relationship(id) => (
      "DELETE FROM relationship_ratings
       WHERE relationship_id = ?1 AND rating_type_id = ?2 AND (?3 IS NULL OR season = ?3)",
      id,
    ),
  };
  conn.execute(sql, rusqlite::params![subject_id, rating_type_id, season])
}
