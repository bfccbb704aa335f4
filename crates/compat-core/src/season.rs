//! Seasons — the cohorts that scope memberships, partner links and ratings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Short season number, e.g. `9` for the ninth season.
pub type SeasonNum = i16;

/// A season and its schedule. Seasons are upserted explicitly; memberships
/// and ratings may refer to a season number before it has a record here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
  pub season:       SeasonNum,
  pub air_date:     NaiveDate,
  pub filming_date: NaiveDate,
}
