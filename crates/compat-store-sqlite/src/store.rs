//! [`SqliteStore`] — the SQLite implementation of [`CompatStore`].

use std::path::Path;

use compat_core::{
  person::{NewPerson, Person, PersonId},
  rating::{NewRatingType, RatingRow, RatingSubject, RatingType, RatingTypeId, require_rating_args},
  relationship::{Relationship, RelationshipId},
  roster::{
    self, MembershipRow, PersonRatingView, PersonView, RelationshipDetails,
    RelationshipRatingView, RelationshipView,
  },
  season::{Season, SeasonNum},
  store::CompatStore,
};
use rusqlite::OptionalExtension as _;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
  Error, Result,
  encode::{
    PERSON_COLUMNS, RawMembership, RawPerson, RawRating, RawRatingType, RawSeason,
    encode_date, encode_decimal,
  },
  graph, ratings,
  roster as queries,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A compatibility store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn raw_memberships(&self, season: Option<SeasonNum>) -> Result<Vec<MembershipRow>> {
    let raws: Vec<RawMembership> = self
      .conn
      .call(move |conn| Ok(queries::memberships(conn, season)?))
      .await?;
    raws.into_iter().map(RawMembership::into_membership).collect()
  }

  async fn raw_ratings(
    &self,
    subject: SubjectTable,
    season: Option<SeasonNum>,
  ) -> Result<Vec<RatingRow>> {
    let raws: Vec<RawRating> = self
      .conn
      .call(move |conn| {
        Ok(match subject {
          SubjectTable::People => queries::person_ratings(conn, season)?,
          SubjectTable::Relationships => queries::relationship_ratings(conn, season)?,
        })
      })
      .await?;
    raws.into_iter().map(RawRating::into_row).collect()
  }

  /// Run a single-row `UPDATE` on a rating type, failing if it matched
  /// nothing.
  async fn update_rating_type_column(
    &self,
    rating_type_id: RatingTypeId,
    sql: &'static str,
    value: String,
  ) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![value, rating_type_id])?))
      .await?;
    if updated == 0 {
      return Err(compat_core::Error::RatingTypeNotFound(rating_type_id).into());
    }
    Ok(())
  }

  /// The roster entry for one member of a relationship, falling back to the
  /// bare person record when they are not enrolled in the season.
  async fn member_view(
    &self,
    people: &[PersonRatingView],
    person_id: PersonId,
    season: SeasonNum,
  ) -> Result<PersonRatingView> {
    if let Some(view) = people.iter().find(|v| v.person.person_id == person_id) {
      return Ok(view.clone());
    }
    let person = self
      .get_person(person_id)
      .await?
      .ok_or(compat_core::Error::PersonNotFound(person_id))?;
    Ok(PersonRatingView { person, season, ratings: Default::default() })
  }
}

#[derive(Debug, Clone, Copy)]
enum SubjectTable {
  People,
  Relationships,
}

// ─── CompatStore impl ────────────────────────────────────────────────────────

impl CompatStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let dob = encode_date(input.date_of_birth);
    let row = input.clone();

    let person_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (
             first_name, last_name, date_of_birth, home_city, home_country,
             person_type, gender, image_path
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.first_name,
            row.last_name,
            dob,
            row.home_city,
            row.home_country,
            row.person_type,
            row.gender,
            row.image_path,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Person::from_new(person_id, input))
  }

  async fn update_person(&self, person_id: PersonId, input: NewPerson) -> Result<Person> {
    let dob = encode_date(input.date_of_birth);
    let row = input.clone();

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE people SET
             first_name = ?2, last_name = ?3, date_of_birth = ?4, home_city = ?5,
             home_country = ?6, person_type = ?7, gender = ?8, image_path = ?9
           WHERE person_id = ?1",
          rusqlite::params![
            person_id,
            row.first_name,
            row.last_name,
            dob,
            row.home_city,
            row.home_country,
            row.person_type,
            row.gender,
            row.image_path,
          ],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(compat_core::Error::PersonNotFound(person_id).into());
    }
    Ok(Person::from_new(person_id, input))
  }

  async fn delete_person(&self, person_id: PersonId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM people WHERE person_id = ?1",
          rusqlite::params![person_id],
        )?)
      })
      .await?;
    debug!(person_id, deleted, "deleted person");
    Ok(())
  }

  async fn get_person(&self, person_id: PersonId) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM people p WHERE p.person_id = ?1"),
              rusqlite::params![person_id],
              |row| RawPerson::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM people p
           ORDER BY p.first_name, p.last_name, p.person_id"
        ))?;
        let rows = stmt
          .query_map([], |row| RawPerson::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn update_person_image_path(&self, person_id: PersonId, image_path: String) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE people SET image_path = ?2 WHERE person_id = ?1",
          rusqlite::params![person_id, image_path],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(compat_core::Error::PersonNotFound(person_id).into());
    }
    Ok(())
  }

  // ── Seasons ───────────────────────────────────────────────────────────────

  async fn upsert_season(&self, season: Season) -> Result<()> {
    let air = encode_date(season.air_date);
    let filming = encode_date(season.filming_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO seasons (season, air_date, filming_date) VALUES (?1, ?2, ?3)
           ON CONFLICT (season)
           DO UPDATE SET air_date = excluded.air_date, filming_date = excluded.filming_date",
          rusqlite::params![season.season, air, filming],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_season(&self, season: SeasonNum) -> Result<Option<Season>> {
    let raw: Option<RawSeason> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT season, air_date, filming_date FROM seasons WHERE season = ?1",
              rusqlite::params![season],
              |row| {
                Ok(RawSeason {
                  season:       row.get(0)?,
                  air_date:     row.get(1)?,
                  filming_date: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSeason::into_season).transpose()
  }

  async fn list_seasons(&self) -> Result<Vec<SeasonNum>> {
    let seasons = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT season FROM seasons ORDER BY season")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<SeasonNum>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(seasons)
  }

  // ── Membership and partner graph ──────────────────────────────────────────

  async fn add_person_to_season(&self, person_id: PersonId, season: SeasonNum) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        graph::require_person(conn, person_id)?;
        conn.execute(
          "INSERT OR IGNORE INTO person_seasons (person_id, season) VALUES (?1, ?2)",
          rusqlite::params![person_id, season],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_person_from_season(&self, person_id: PersonId, season: SeasonNum) -> Result<()> {
    self
      .conn
      .call(move |conn| graph::remove_person_from_season(conn, person_id, season))
      .await
      .map_err(|e| Error::in_transaction("remove_person_from_season", e))
  }

  async fn set_partner(
    &self,
    person_id: PersonId,
    partner_id: Option<PersonId>,
    season: SeasonNum,
  ) -> Result<()> {
    if partner_id == Some(person_id) {
      return Err(
        compat_core::Error::InvalidArgument(format!(
          "person {person_id} cannot be their own partner"
        ))
        .into(),
      );
    }

    self
      .conn
      .call(move |conn| graph::set_partner(conn, person_id, partner_id, season))
      .await
      .map_err(|e| Error::in_transaction("set_partner", e))
  }

  async fn get_partner(&self, person_id: PersonId, season: SeasonNum) -> Result<Option<PersonId>> {
    let partner = self
      .conn
      .call(move |conn| Ok(graph::get_partner(conn, person_id, season)?))
      .await?;
    Ok(partner)
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  async fn get_relationship(&self, relationship_id: RelationshipId) -> Result<Option<Relationship>> {
    let relationship = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT relationship_id, person_id_1, person_id_2, relationship_type, image_path
               FROM relationships WHERE relationship_id = ?1",
              rusqlite::params![relationship_id],
              |row| {
                Ok(Relationship {
                  relationship_id:   row.get(0)?,
                  person_id_1:       row.get(1)?,
                  person_id_2:       row.get(2)?,
                  relationship_type: row.get(3)?,
                  image_path:        row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(relationship)
  }

  async fn update_relationship_image_path(
    &self,
    relationship_id: RelationshipId,
    image_path: String,
  ) -> Result<()> {
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE relationships SET image_path = ?2 WHERE relationship_id = ?1",
          rusqlite::params![relationship_id, image_path],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(compat_core::Error::RelationshipNotFound(relationship_id).into());
    }
    Ok(())
  }

  // ── Rating types ──────────────────────────────────────────────────────────

  async fn add_rating_type(&self, input: NewRatingType) -> Result<RatingType> {
    let name = input.name.clone();
    let weight = encode_decimal(input.weight);
    let category = input.category.clone();

    let rating_type_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO rating_types (name, weight, category) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, weight, category],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(RatingType::from_new(rating_type_id, input))
  }

  async fn list_rating_types(&self) -> Result<Vec<RatingType>> {
    let raws: Vec<RawRatingType> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT rating_type_id, name, weight, category
           FROM rating_types ORDER BY name, rating_type_id",
        )?;
        let rows = stmt
          .query_map([], RawRatingType::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRatingType::into_rating_type).collect()
  }

  async fn update_rating_type(
    &self,
    rating_type_id: RatingTypeId,
    input: NewRatingType,
  ) -> Result<RatingType> {
    let name = input.name.clone();
    let weight = encode_decimal(input.weight);
    let category = input.category.clone();

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE rating_types SET name = ?2, weight = ?3, category = ?4
           WHERE rating_type_id = ?1",
          rusqlite::params![rating_type_id, name, weight, category],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(compat_core::Error::RatingTypeNotFound(rating_type_id).into());
    }
    Ok(RatingType::from_new(rating_type_id, input))
  }

  async fn update_rating_weight(&self, rating_type_id: RatingTypeId, weight: Decimal) -> Result<()> {
    self
      .update_rating_type_column(
        rating_type_id,
        "UPDATE rating_types SET weight = ?1 WHERE rating_type_id = ?2",
        encode_decimal(weight),
      )
      .await
  }

  async fn rename_rating_type(&self, rating_type_id: RatingTypeId, name: String) -> Result<()> {
    self
      .update_rating_type_column(
        rating_type_id,
        "UPDATE rating_types SET name = ?1 WHERE rating_type_id = ?2",
        name,
      )
      .await
  }

  async fn delete_rating_type(&self, rating_type_id: RatingTypeId) -> Result<()> {
    self
      .conn
      .call(move |conn| graph::delete_rating_type(conn, rating_type_id))
      .await
      .map_err(|e| Error::in_transaction("delete_rating_type", e))
  }

  // ── Ratings ───────────────────────────────────────────────────────────────

  async fn upsert_person_rating(
    &self,
    person_id: PersonId,
    rating_type_id: RatingTypeId,
    value: Option<Decimal>,
    season: Option<SeasonNum>,
  ) -> Result<()> {
    let (value, season) = require_rating_args(value, season)?;
    let value = encode_decimal(value);

    self
      .conn
      .call(move |conn| {
        ratings::upsert_person_rating(conn, person_id, rating_type_id, value, season)
      })
      .await
      .map_err(|e| Error::in_transaction("upsert_person_rating", e))
  }

  async fn upsert_relationship_rating(
    &self,
    relationship_id: RelationshipId,
    rating_type_id: RatingTypeId,
    value: Option<Decimal>,
    season: Option<SeasonNum>,
  ) -> Result<()> {
    let (value, season) = require_rating_args(value, season)?;
    let value = encode_decimal(value);

    self
      .conn
      .call(move |conn| {
        ratings::upsert_relationship_rating(conn, relationship_id, rating_type_id, value, season)
      })
      .await
      .map_err(|e| Error::in_transaction("upsert_relationship_rating", e))
  }

  async fn remove_rating(
    &self,
    subject: RatingSubject,
    rating_type_id: RatingTypeId,
    season: Option<SeasonNum>,
  ) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| Ok(ratings::remove_rating(conn, subject, rating_type_id, season)?))
      .await?;
    debug!(?subject, rating_type_id, ?season, removed, "removed ratings");
    Ok(())
  }

  // ── Rosters ───────────────────────────────────────────────────────────────

  async fn get_people(&self, season: Option<SeasonNum>) -> Result<Vec<PersonView>> {
    let memberships = self.raw_memberships(season).await?;
    let links = self
      .conn
      .call(move |conn| Ok(queries::season_links(conn, season)?))
      .await?;
    Ok(roster::build_people(memberships, &links))
  }

  async fn get_people_with_ratings(&self, season: Option<SeasonNum>) -> Result<Vec<PersonRatingView>> {
    let memberships = self.raw_memberships(season).await?;
    let ratings = self.raw_ratings(SubjectTable::People, season).await?;
    Ok(roster::build_people_with_ratings(memberships, &ratings))
  }

  async fn get_relationships(&self, season: Option<SeasonNum>) -> Result<Vec<RelationshipView>> {
    let rows = self
      .conn
      .call(move |conn| Ok(queries::relationship_rows(conn, season)?))
      .await?;
    Ok(roster::build_relationships(rows))
  }

  async fn get_relationships_with_ratings(
    &self,
    season: Option<SeasonNum>,
  ) -> Result<Vec<RelationshipRatingView>> {
    let rows = self
      .conn
      .call(move |conn| Ok(queries::relationship_rows(conn, season)?))
      .await?;
    let ratings = self.raw_ratings(SubjectTable::Relationships, season).await?;
    Ok(roster::build_relationships_with_ratings(rows, &ratings))
  }

  async fn get_relationship_details(
    &self,
    relationship_id: RelationshipId,
    season: Option<SeasonNum>,
  ) -> Result<Option<RelationshipDetails>> {
    let relationship = self
      .get_relationships_with_ratings(season)
      .await?
      .into_iter()
      .find(|v| v.view.relationship.relationship_id == relationship_id);
    let Some(relationship) = relationship else {
      return Ok(None);
    };

    let shown_season = relationship.view.season;
    let people = self.get_people_with_ratings(season).await?;
    let person_1 = self
      .member_view(&people, relationship.view.relationship.person_id_1, shown_season)
      .await?;
    let person_2 = self
      .member_view(&people, relationship.view.relationship.person_id_2, shown_season)
      .await?;
    let rating_types = self.list_rating_types().await?;

    Ok(Some(RelationshipDetails { relationship, person_1, person_2, rating_types }))
  }
}
