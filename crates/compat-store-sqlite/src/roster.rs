//! Flat roster queries. Folding rows into per-subject views happens in
//! [`compat_core::roster`].
//!
//! Every query takes an optional season; `?1 IS NULL` disables the filter.

use compat_core::{
  person::PersonSummary,
  relationship::{Relationship, SeasonLink},
  roster::RelationshipRow,
  season::SeasonNum,
};
use rusqlite::Connection;

use crate::encode::{PERSON_COLUMNS, RawMembership, RawPerson, RawRating};

pub fn memberships(
  conn: &Connection,
  season: Option<SeasonNum>,
) -> rusqlite::Result<Vec<RawMembership>> {
  let sql = format!(
    "SELECT ps.season, {PERSON_COLUMNS}
     FROM person_seasons ps
     JOIN people p ON p.person_id = ps.person_id
     WHERE (?1 IS NULL OR ps.season = ?1)
     ORDER BY ps.person_id, ps.season"
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(rusqlite::params![season], |row| {
      Ok(RawMembership { season: row.get(0)?, person: RawPerson::read(row, 1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn season_links(
  conn: &Connection,
  season: Option<SeasonNum>,
) -> rusqlite::Result<Vec<SeasonLink>> {
  let mut stmt = conn.prepare(
    "SELECT rs.season, r.relationship_id, r.person_id_1, r.person_id_2
     FROM relationship_seasons rs
     JOIN relationships r ON r.relationship_id = rs.relationship_id
     WHERE (?1 IS NULL OR rs.season = ?1)
     ORDER BY r.relationship_id, rs.season",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![season], |row| {
      Ok(SeasonLink {
        season:          row.get(0)?,
        relationship_id: row.get(1)?,
        person_id_1:     row.get(2)?,
        person_id_2:     row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn relationship_rows(
  conn: &Connection,
  season: Option<SeasonNum>,
) -> rusqlite::Result<Vec<RelationshipRow>> {
  let mut stmt = conn.prepare(
    "SELECT rs.season, r.relationship_id, r.person_id_1, r.person_id_2,
            r.relationship_type, r.image_path,
            p1.first_name, p1.last_name, p1.image_path,
            p2.first_name, p2.last_name, p2.image_path
     FROM relationship_seasons rs
     JOIN relationships r ON r.relationship_id = rs.relationship_id
     JOIN people p1       ON p1.person_id      = r.person_id_1
     JOIN people p2       ON p2.person_id      = r.person_id_2
     WHERE (?1 IS NULL OR rs.season = ?1)
     ORDER BY r.relationship_id, rs.season",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![season], |row| {
      let person_id_1: i64 = row.get(2)?;
      let person_id_2: i64 = row.get(3)?;
      Ok(RelationshipRow {
        season:       row.get(0)?,
        relationship: Relationship {
          relationship_id:   row.get(1)?,
          person_id_1,
          person_id_2,
          relationship_type: row.get(4)?,
          image_path:        row.get(5)?,
        },
        person_1:     PersonSummary {
          person_id:  person_id_1,
          first_name: row.get(6)?,
          last_name:  row.get(7)?,
          image_path: row.get(8)?,
        },
        person_2:     PersonSummary {
          person_id:  person_id_2,
          first_name: row.get(9)?,
          last_name:  row.get(10)?,
          image_path: row.get(11)?,
        },
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn person_ratings(
  conn: &Connection,
  season: Option<SeasonNum>,
) -> rusqlite::Result<Vec<RawRating>> {
  let mut stmt = conn.prepare(
    "SELECT person_id, season, rating_type_id, rating_value
     FROM person_ratings
     WHERE (?1 IS NULL OR season = ?1)",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![season], RawRating::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn relationship_ratings(
  conn: &Connection,
  season: Option<SeasonNum>,
) -> rusqlite::Result<Vec<RawRating>> {
  let mut stmt = conn.prepare(
    "SELECT relationship_id, season, rating_type_id, rating_value
     FROM relationship_ratings
     WHERE (?1 IS NULL OR season = ?1)",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![season], RawRating::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
