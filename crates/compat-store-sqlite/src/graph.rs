//! Partner graph maintenance and cascading deletes.
//!
//! Each public function here is the body of one `tokio_rusqlite` closure and
//! runs inside a single `IMMEDIATE` transaction. Cascades collect the
//! affected ids first, then delete in dependency order: ratings, then season
//! links, then the parent rows left orphaned.

use compat_core::{
  person::PersonId,
  rating::RatingTypeId,
  relationship::{DEFAULT_RELATIONSHIP_TYPE, RelationshipId},
  season::SeasonNum,
};
use rusqlite::{Connection, OptionalExtension as _, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::{
  Error,
  error::{abort, is_constraint},
};

// ─── Lookups ─────────────────────────────────────────────────────────────────

pub fn require_person(conn: &Connection, person_id: PersonId) -> tokio_rusqlite::Result<()> {
  let found = conn
    .query_row(
      "SELECT 1 FROM people WHERE person_id = ?1",
      rusqlite::params![person_id],
      |_| Ok(()),
    )
    .optional()?;
  found.ok_or_else(|| abort(compat_core::Error::PersonNotFound(person_id)))
}

/// The relationship's two people, or `RelationshipNotFound`.
pub fn require_relationship(
  conn: &Connection,
  relationship_id: RelationshipId,
) -> tokio_rusqlite::Result<(PersonId, PersonId)> {
  let found = conn
    .query_row(
      "SELECT person_id_1, person_id_2 FROM relationships WHERE relationship_id = ?1",
      rusqlite::params![relationship_id],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;
  found.ok_or_else(|| abort(compat_core::Error::RelationshipNotFound(relationship_id)))
}

pub fn require_rating_type(
  conn: &Connection,
  rating_type_id: RatingTypeId,
) -> tokio_rusqlite::Result<()> {
  let found = conn
    .query_row(
      "SELECT 1 FROM rating_types WHERE rating_type_id = ?1",
      rusqlite::params![rating_type_id],
      |_| Ok(()),
    )
    .optional()?;
  found.ok_or_else(|| abort(compat_core::Error::RatingTypeNotFound(rating_type_id)))
}

/// The relationship for the unordered pair `{a, b}`, checking both column
/// orders as one predicate.
fn find_pair(
  conn: &Connection,
  a: PersonId,
  b: PersonId,
) -> rusqlite::Result<Option<RelationshipId>> {
  conn
    .query_row(
      "SELECT relationship_id FROM relationships
       WHERE (person_id_1 = ?1 AND person_id_2 = ?2)
          OR (person_id_1 = ?2 AND person_id_2 = ?1)",
      rusqlite::params![a, b],
      |r| r.get(0),
    )
    .optional()
}

/// Return the pair's relationship, creating it if needed. If the insert
/// loses a race on the pair uniqueness index, the lookup is retried once.
fn find_or_create_pair(
  tx: &Transaction<'_>,
  a: PersonId,
  b: PersonId,
) -> tokio_rusqlite::Result<RelationshipId> {
  if let Some(id) = find_pair(tx, a, b)? {
    return Ok(id);
  }

  let inserted = tx.execute(
    "INSERT INTO relationships (person_id_1, person_id_2, relationship_type, image_path)
     VALUES (?1, ?2, ?3, '')",
    rusqlite::params![a, b, DEFAULT_RELATIONSHIP_TYPE],
  );

  match inserted {
    Ok(_) => {
      let id = tx.last_insert_rowid();
      info!(relationship_id = id, person_id_1 = a, person_id_2 = b, "created relationship");
      Ok(id)
    }
    Err(e) if is_constraint(&e) => {
      debug!(person_id_1 = a, person_id_2 = b, "pair insert collided; retrying lookup");
      find_pair(tx, a, b)?
        .ok_or_else(|| abort(Error::ConstraintViolation(e.to_string())))
    }
    Err(e) => Err(e.into()),
  }
}

/// Link a relationship into `season`, enrolling both people in it.
/// Idempotent; returns how many memberships were newly created.
pub fn link_pair(
  tx: &Transaction<'_>,
  relationship_id: RelationshipId,
  person_id_1: PersonId,
  person_id_2: PersonId,
  season: SeasonNum,
) -> rusqlite::Result<usize> {
  let mut enrol =
    tx.prepare("INSERT OR IGNORE INTO person_seasons (person_id, season) VALUES (?1, ?2)")?;
  let enrolled = enrol.execute(rusqlite::params![person_id_1, season])?
    + enrol.execute(rusqlite::params![person_id_2, season])?;
  tx.execute(
    "INSERT OR IGNORE INTO relationship_seasons (season, relationship_id) VALUES (?1, ?2)",
    rusqlite::params![season, relationship_id],
  )?;
  Ok(enrolled)
}

// ─── Cascades ────────────────────────────────────────────────────────────────

/// Delete relationships among `ids` that have no season link left.
fn delete_orphans(tx: &Transaction<'_>, ids: &[RelationshipId]) -> rusqlite::Result<usize> {
  let mut stmt = tx.prepare(
    "DELETE FROM relationships
     WHERE relationship_id = ?1
       AND NOT EXISTS (
         SELECT 1 FROM relationship_seasons WHERE relationship_id = ?1
       )",
  )?;
  let mut deleted = 0;
  for id in ids {
    if stmt.execute(rusqlite::params![id])? > 0 {
      info!(relationship_id = id, "deleted orphaned relationship");
      deleted += 1;
    }
  }
  Ok(deleted)
}

/// Unlink every relationship involving `person_id` from `season`, dropping
/// the relationship ratings scoped to those links and any relationship left
/// orphaned.
fn unlink_person(
  tx: &Transaction<'_>,
  person_id: PersonId,
  season: SeasonNum,
) -> rusqlite::Result<()> {
  let ids: Vec<RelationshipId> = {
    let mut stmt = tx.prepare(
      "SELECT rs.relationship_id
       FROM relationship_seasons rs
       JOIN relationships r ON r.relationship_id = rs.relationship_id
       WHERE rs.season = ?1
         AND (r.person_id_1 = ?2 OR r.person_id_2 = ?2)
       ORDER BY rs.relationship_id",
    )?;
    let ids = stmt
      .query_map(rusqlite::params![season, person_id], |r| r.get(0))?
      .collect::<rusqlite::Result<Vec<RelationshipId>>>()?;
    ids
  };

  if ids.is_empty() {
    return Ok(());
  }

  let mut ratings = 0;
  let mut links = 0;
  for id in &ids {
    ratings += tx.execute(
      "DELETE FROM relationship_ratings WHERE relationship_id = ?1 AND season = ?2",
      rusqlite::params![id, season],
    )?;
    links += tx.execute(
      "DELETE FROM relationship_seasons WHERE relationship_id = ?1 AND season = ?2",
      rusqlite::params![id, season],
    )?;
  }
  let orphans = delete_orphans(tx, &ids)?;

  debug!(person_id, season, ratings, links, orphans, "unlinked relationships");
  Ok(())
}

// ─── Operations ──────────────────────────────────────────────────────────────

pub fn set_partner(
  conn: &mut Connection,
  person_id: PersonId,
  partner_id: Option<PersonId>,
  season: SeasonNum,
) -> tokio_rusqlite::Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  match partner_id {
    None => unlink_person(&tx, person_id, season)?,
    Some(partner_id) => {
      require_person(&tx, person_id)?;
      require_person(&tx, partner_id)?;
      let relationship_id = find_or_create_pair(&tx, person_id, partner_id)?;
      let enrolled = link_pair(&tx, relationship_id, person_id, partner_id, season)?;
      debug!(person_id, partner_id, season, relationship_id, enrolled, "linked partners");
    }
  }

  tx.commit()?;
  Ok(())
}

pub fn get_partner(
  conn: &Connection,
  person_id: PersonId,
  season: SeasonNum,
) -> rusqlite::Result<Option<PersonId>> {
  conn
    .query_row(
      "SELECT CASE WHEN r.person_id_1 = ?1 THEN r.person_id_2 ELSE r.person_id_1 END
       FROM relationship_seasons rs
       JOIN relationships r ON r.relationship_id = rs.relationship_id
       WHERE rs.season = ?2
         AND (r.person_id_1 = ?1 OR r.person_id_2 = ?1)
       ORDER BY r.relationship_id
       LIMIT 1",
      rusqlite::params![person_id, season],
      |r| r.get(0),
    )
    .optional()
}

pub fn remove_person_from_season(
  conn: &mut Connection,
  person_id: PersonId,
  season: SeasonNum,
) -> tokio_rusqlite::Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  // Membership and its ratings go first so the link counts below are current.
  let ratings = tx.execute(
    "DELETE FROM person_ratings WHERE person_id = ?1 AND season = ?2",
    rusqlite::params![person_id, season],
  )?;
  let membership = tx.execute(
    "DELETE FROM person_seasons WHERE person_id = ?1 AND season = ?2",
    rusqlite::params![person_id, season],
  )?;
  debug!(person_id, season, ratings, membership, "removed season membership");

  unlink_person(&tx, person_id, season)?;

  tx.commit()?;
  Ok(())
}

pub fn delete_rating_type(
  conn: &mut Connection,
  rating_type_id: RatingTypeId,
) -> tokio_rusqlite::Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let person_ratings = tx.execute(
    "DELETE FROM person_ratings WHERE rating_type_id = ?1",
    rusqlite::params![rating_type_id],
  )?;
  let relationship_ratings = tx.execute(
    "DELETE FROM relationship_ratings WHERE rating_type_id = ?1",
    rusqlite::params![rating_type_id],
  )?;
  let rating_types = tx.execute(
    "DELETE FROM rating_types WHERE rating_type_id = ?1",
    rusqlite::params![rating_type_id],
  )?;

  tx.commit()?;
  info!(
    rating_type_id,
    person_ratings, relationship_ratings, rating_types, "deleted rating type"
  );
  Ok(())
}
