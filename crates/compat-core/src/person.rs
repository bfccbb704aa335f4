//! People — the individuals who are enrolled in seasons, paired into
//! relationships and rated.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Store-assigned identity of a [`Person`].
pub type PersonId = i64;

/// A person record with its biographical attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:     PersonId,
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: NaiveDate,
  pub home_city:     String,
  pub home_country:  String,
  /// Free-text cast role, e.g. "Foreign" or "American".
  pub person_type:   String,
  pub gender:        String,
  /// Path handed back by the image store; empty when no image was uploaded.
  pub image_path:    String,
}

impl Person {
  /// Attach a store-assigned id to the input fields.
  pub fn from_new(person_id: PersonId, input: NewPerson) -> Self {
    Self {
      person_id,
      first_name: input.first_name,
      last_name: input.last_name,
      date_of_birth: input.date_of_birth,
      home_city: input.home_city,
      home_country: input.home_country,
      person_type: input.person_type,
      gender: input.gender,
      image_path: input.image_path,
    }
  }

  pub fn full_name(&self) -> String {
    full_name(&self.first_name, &self.last_name)
  }

  /// Age in whole years on `today`, counting a birthday only once reached.
  pub fn age_on(&self, today: NaiveDate) -> i32 {
    let mut age = today.year() - self.date_of_birth.year();
    if (today.month(), today.day())
      < (self.date_of_birth.month(), self.date_of_birth.day())
    {
      age -= 1;
    }
    age
  }

  pub fn age(&self) -> i32 { self.age_on(Local::now().date_naive()) }
}

/// Input to [`crate::store::CompatStore::add_person`] and
/// [`crate::store::CompatStore::update_person`]. The id is never accepted
/// from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub first_name:    String,
  pub last_name:     String,
  pub date_of_birth: NaiveDate,
  #[serde(default)]
  pub home_city:     String,
  #[serde(default)]
  pub home_country:  String,
  #[serde(default)]
  pub person_type:   String,
  #[serde(default)]
  pub gender:        String,
  #[serde(default)]
  pub image_path:    String,
}

impl NewPerson {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    date_of_birth: NaiveDate,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      date_of_birth,
      home_city: String::new(),
      home_country: String::new(),
      person_type: String::new(),
      gender: String::new(),
      image_path: String::new(),
    }
  }
}

/// The identifying slice of a person embedded in relationship views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
  pub person_id:  PersonId,
  pub first_name: String,
  pub last_name:  String,
  pub image_path: String,
}

impl PersonSummary {
  pub fn full_name(&self) -> String {
    full_name(&self.first_name, &self.last_name)
  }
}

impl From<&Person> for PersonSummary {
  fn from(p: &Person) -> Self {
    Self {
      person_id:  p.person_id,
      first_name: p.first_name.clone(),
      last_name:  p.last_name.clone(),
      image_path: p.image_path.clone(),
    }
  }
}

fn full_name(first: &str, last: &str) -> String {
  format!("{first} {last}").trim().to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn person(dob: NaiveDate) -> Person {
    Person::from_new(1, NewPerson::new("Anna", "Campisi", dob))
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn age_counts_birthday_only_once_reached() {
    let p = person(date(1990, 6, 15));
    assert_eq!(p.age_on(date(2020, 6, 14)), 29);
    assert_eq!(p.age_on(date(2020, 6, 15)), 30);
    assert_eq!(p.age_on(date(2020, 12, 1)), 30);
  }

  #[test]
  fn full_name_trims_missing_parts() {
    let mut p = person(date(1990, 1, 1));
    assert_eq!(p.full_name(), "Anna Campisi");
    p.last_name.clear();
    assert_eq!(p.full_name(), "Anna");
  }
}
