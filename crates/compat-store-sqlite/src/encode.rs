//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 strings and decimals as their canonical
//! string form, so values round-trip exactly. Ids and season numbers are
//! native integers.

use chrono::NaiveDate;
use compat_core::{
  person::Person,
  rating::{RatingRow, RatingType},
  roster::MembershipRow,
  season::{Season, SeasonNum},
};
use rust_decimal::Decimal;

use crate::{Error, Result};

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(s.parse::<Decimal>()?) }

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::read`], for a `people` table aliased `p`.
pub const PERSON_COLUMNS: &str = "p.person_id, p.first_name, p.last_name, \
  p.date_of_birth, p.home_city, p.home_country, p.person_type, p.gender, \
  p.image_path";

/// Raw values read directly from a `people` row.
pub struct RawPerson {
  pub person_id:     i64,
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: String,
  pub home_city:     String,
  pub home_country:  String,
  pub person_type:   String,
  pub gender:        String,
  pub image_path:    String,
}

impl RawPerson {
  /// Read the [`PERSON_COLUMNS`] starting at column `at`.
  pub fn read(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:     row.get(at)?,
      first_name:    row.get(at + 1)?,
      last_name:     row.get(at + 2)?,
      date_of_birth: row.get(at + 3)?,
      home_city:     row.get(at + 4)?,
      home_country:  row.get(at + 5)?,
      person_type:   row.get(at + 6)?,
      gender:        row.get(at + 7)?,
      image_path:    row.get(at + 8)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:     self.person_id,
      first_name:    self.first_name,
      last_name:     self.last_name,
      date_of_birth: decode_date(&self.date_of_birth)?,
      home_city:     self.home_city,
      home_country:  self.home_country,
      person_type:   self.person_type,
      gender:        self.gender,
      image_path:    self.image_path,
    })
  }
}

/// A `person_seasons` row joined with its person.
pub struct RawMembership {
  pub season: SeasonNum,
  pub person: RawPerson,
}

impl RawMembership {
  pub fn into_membership(self) -> Result<MembershipRow> {
    Ok(MembershipRow { person: self.person.into_person()?, season: self.season })
  }
}

/// Raw values read directly from a `rating_types` row.
pub struct RawRatingType {
  pub rating_type_id: i64,
  pub name:           String,
  pub weight:         String,
  pub category:       String,
}

impl RawRatingType {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rating_type_id: row.get(0)?,
      name:           row.get(1)?,
      weight:         row.get(2)?,
      category:       row.get(3)?,
    })
  }

  pub fn into_rating_type(self) -> Result<RatingType> {
    Ok(RatingType {
      rating_type_id: self.rating_type_id,
      name:           self.name,
      weight:         decode_decimal(&self.weight)?,
      category:       self.category,
    })
  }
}

/// Raw values read from `person_ratings` or `relationship_ratings`.
pub struct RawRating {
  pub subject_id:     i64,
  pub season:         SeasonNum,
  pub rating_type_id: i64,
  pub rating_value:   String,
}

impl RawRating {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:     row.get(0)?,
      season:         row.get(1)?,
      rating_type_id: row.get(2)?,
      rating_value:   row.get(3)?,
    })
  }

  pub fn into_row(self) -> Result<RatingRow> {
    Ok(RatingRow {
      subject_id:     self.subject_id,
      season:         self.season,
      rating_type_id: self.rating_type_id,
      value:          decode_decimal(&self.rating_value)?,
    })
  }
}

/// Raw values read directly from a `seasons` row.
pub struct RawSeason {
  pub season:       SeasonNum,
  pub air_date:     String,
  pub filming_date: String,
}

impl RawSeason {
  pub fn into_season(self) -> Result<Season> {
    Ok(Season {
      season:       self.season,
      air_date:     decode_date(&self.air_date)?,
      filming_date: decode_date(&self.filming_date)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decimal_keeps_scale() {
    let d: Decimal = "7.50".parse().unwrap();
    assert_eq!(encode_decimal(d), "7.50");
    assert_eq!(decode_decimal("7.50").unwrap(), d);
  }

  #[test]
  fn bad_date_is_reported() {
    assert!(matches!(decode_date("15/06/1990"), Err(Error::DateParse(_))));
  }
}
