//! Subcommand definitions and their dispatch onto a [`CompatStore`].
//!
//! Every command yields a JSON value; `main` prints it.

use anyhow::{Context as _, Result, anyhow};
use chrono::NaiveDate;
use clap::Subcommand;
use compat_core::{
  person::{NewPerson, Person, PersonId},
  rating::{NewRatingType, RatingSubject, RatingTypeId},
  relationship::RelationshipId,
  score::compute_score,
  season::{Season, SeasonNum},
  store::CompatStore,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use crate::settings::CliConfig;

// ─── Command tree ─────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage people, their season memberships and partners.
  #[command(subcommand)]
  Person(PersonCommand),

  /// Manage seasons.
  #[command(subcommand)]
  Season(SeasonCommand),

  /// Manage rating types and their weights.
  #[command(subcommand)]
  RatingType(RatingTypeCommand),

  /// Set a rating value for a season.
  #[command(subcommand)]
  Rate(RateCommand),

  /// Remove ratings. Without `--season`, every season is cleared.
  #[command(subcommand)]
  Unrate(UnrateCommand),

  /// Season rosters.
  #[command(subcommand)]
  Roster(RosterCommand),

  /// A relationship with both people, their ratings and scores.
  Details {
    relationship: RelationshipId,
    #[arg(long)]
    season:       Option<SeasonNum>,
  },

  /// Weighted scores for every person and relationship on a roster.
  Scores {
    #[arg(long)]
    season: Option<SeasonNum>,
  },
}

#[derive(Subcommand, Debug)]
pub enum PersonCommand {
  Add {
    first_name:  String,
    last_name:   String,
    /// Date of birth, `YYYY-MM-DD`.
    #[arg(long)]
    dob:         NaiveDate,
    #[arg(long, default_value = "")]
    city:        String,
    #[arg(long, default_value = "")]
    country:     String,
    #[arg(long, default_value = "")]
    person_type: String,
    #[arg(long, default_value = "")]
    gender:      String,
    #[arg(long, default_value = "")]
    image_path:  String,
  },
  List,
  Delete {
    person: PersonId,
  },
  /// Enrol a person in a season.
  Enroll {
    person: PersonId,
    #[arg(long)]
    season: Option<SeasonNum>,
  },
  /// Remove a person from a season, with their ratings and partner links.
  Unenroll {
    person: PersonId,
    #[arg(long)]
    season: Option<SeasonNum>,
  },
  /// Assign a partner for a season; omit `--with` to clear it.
  Partner {
    person: PersonId,
    #[arg(long = "with")]
    with:   Option<PersonId>,
    #[arg(long)]
    season: Option<SeasonNum>,
  },
}

#[derive(Subcommand, Debug)]
pub enum SeasonCommand {
  Upsert {
    season:       SeasonNum,
    #[arg(long)]
    air_date:     NaiveDate,
    #[arg(long)]
    filming_date: NaiveDate,
  },
  List,
}

#[derive(Subcommand, Debug)]
pub enum RatingTypeCommand {
  Add {
    name:     String,
    #[arg(long, default_value = "1")]
    weight:   Decimal,
    #[arg(long, default_value = "general")]
    category: String,
  },
  List,
  Weight {
    rating_type: RatingTypeId,
    weight:      Decimal,
  },
  Rename {
    rating_type: RatingTypeId,
    name:        String,
  },
  Delete {
    rating_type: RatingTypeId,
  },
}

#[derive(Subcommand, Debug)]
pub enum RateCommand {
  Person {
    person:      PersonId,
    rating_type: RatingTypeId,
    value:       Decimal,
    #[arg(long)]
    season:      Option<SeasonNum>,
  },
  Relationship {
    relationship: RelationshipId,
    rating_type:  RatingTypeId,
    value:        Decimal,
    #[arg(long)]
    season:       Option<SeasonNum>,
  },
}

#[derive(Subcommand, Debug)]
pub enum UnrateCommand {
  Person {
    person:      PersonId,
    rating_type: RatingTypeId,
    #[arg(long)]
    season:      Option<SeasonNum>,
  },
  Relationship {
    relationship: RelationshipId,
    rating_type:  RatingTypeId,
    #[arg(long)]
    season:       Option<SeasonNum>,
  },
}

#[derive(Subcommand, Debug)]
pub enum RosterCommand {
  People {
    #[arg(long)]
    season: Option<SeasonNum>,
  },
  PeopleRatings {
    #[arg(long)]
    season: Option<SeasonNum>,
  },
  Relationships {
    #[arg(long)]
    season: Option<SeasonNum>,
  },
  RelationshipRatings {
    #[arg(long)]
    season: Option<SeasonNum>,
  },
}

// ─── Scores ───────────────────────────────────────────────────────────────────

/// One scored roster entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreLine {
  pub subject: RatingSubject,
  pub name:    String,
  pub season:  SeasonNum,
  pub score:   Option<Decimal>,
}

async fn scores<S>(store: &S, season: Option<SeasonNum>) -> Result<Vec<ScoreLine>>
where
  S: CompatStore,
{
  let rating_types = store.list_rating_types().await?;
  let people = store.get_people_with_ratings(season).await?;
  let relationships = store.get_relationships_with_ratings(season).await?;

  let mut lines = Vec::with_capacity(people.len() + relationships.len());
  for v in people {
    let subject = RatingSubject::Person(v.person.person_id);
    let breakdown = compute_score(&v.ratings, &rating_types)
      .with_context(|| format!("scoring person {}", v.person.person_id))?;
    lines.push(ScoreLine {
      subject,
      name:   v.person.full_name(),
      season: v.season,
      score:  breakdown.score,
    });
  }
  for v in relationships {
    let relationship_id = v.view.relationship.relationship_id;
    let breakdown = compute_score(&v.ratings, &rating_types)
      .with_context(|| format!("scoring relationship {relationship_id}"))?;
    lines.push(ScoreLine {
      subject: RatingSubject::Relationship(relationship_id),
      name:    v.view.couple_display_name(),
      season:  v.view.season,
      score:   breakdown.score,
    });
  }

  Ok(lines)
}

/// A person record with their current age alongside.
fn person_json(person: &Person) -> Result<Value> {
  let mut value = serde_json::to_value(person)?;
  value["age"] = json!(person.age());
  Ok(value)
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

fn require_season(season: Option<SeasonNum>) -> Result<SeasonNum> {
  season.ok_or_else(|| anyhow!("no season given: pass --season or set default_season"))
}

/// Run one command against `store` and return its JSON output.
pub async fn run<S>(store: &S, cfg: &CliConfig, command: Command) -> Result<Value>
where
  S: CompatStore,
{
  let value = match command {
    Command::Person(cmd) => run_person(store, cfg, cmd).await?,
    Command::Season(cmd) => run_season(store, cmd).await?,
    Command::RatingType(cmd) => run_rating_type(store, cmd).await?,

    Command::Rate(RateCommand::Person { person, rating_type, value, season }) => {
      let season = cfg.season_or_default(season);
      store
        .upsert_person_rating(person, rating_type, Some(value), season)
        .await
        .with_context(|| format!("rating person {person}"))?;
      json!({ "person_id": person, "rating_type_id": rating_type, "season": season, "value": value })
    }
    Command::Rate(RateCommand::Relationship { relationship, rating_type, value, season }) => {
      let season = cfg.season_or_default(season);
      store
        .upsert_relationship_rating(relationship, rating_type, Some(value), season)
        .await
        .with_context(|| format!("rating relationship {relationship}"))?;
      json!({
        "relationship_id": relationship,
        "rating_type_id": rating_type,
        "season": season,
        "value": value,
      })
    }

    // No default season here: omitting `--season` means every season.
    Command::Unrate(UnrateCommand::Person { person, rating_type, season }) => {
      let subject = RatingSubject::Person(person);
      store.remove_rating(subject, rating_type, season).await?;
      json!({ "removed": subject, "rating_type_id": rating_type, "season": season })
    }
    Command::Unrate(UnrateCommand::Relationship { relationship, rating_type, season }) => {
      let subject = RatingSubject::Relationship(relationship);
      store.remove_rating(subject, rating_type, season).await?;
      json!({ "removed": subject, "rating_type_id": rating_type, "season": season })
    }

    Command::Roster(cmd) => run_roster(store, cfg, cmd).await?,

    Command::Details { relationship, season } => {
      let details = store
        .get_relationship_details(relationship, cfg.season_or_default(season))
        .await?
        .ok_or_else(|| anyhow!("relationship {relationship} is not on that roster"))?;
      let scores = details
        .scores()
        .with_context(|| format!("scoring relationship {relationship}"))?;
      json!({ "details": details, "scores": scores })
    }

    Command::Scores { season } => {
      serde_json::to_value(scores(store, cfg.season_or_default(season)).await?)?
    }
  };
  Ok(value)
}

async fn run_person<S: CompatStore>(
  store: &S,
  cfg: &CliConfig,
  command: PersonCommand,
) -> Result<Value> {
  let value = match command {
    PersonCommand::Add {
      first_name,
      last_name,
      dob,
      city,
      country,
      person_type,
      gender,
      image_path,
    } => {
      let input = NewPerson {
        first_name,
        last_name,
        date_of_birth: dob,
        home_city: city,
        home_country: country,
        person_type,
        gender,
        image_path,
      };
      serde_json::to_value(store.add_person(input).await?)?
    }
    PersonCommand::List => Value::Array(
      store
        .list_people()
        .await?
        .iter()
        .map(person_json)
        .collect::<Result<Vec<_>>>()?,
    ),
    PersonCommand::Delete { person } => {
      store.delete_person(person).await?;
      json!({ "deleted": person })
    }
    PersonCommand::Enroll { person, season } => {
      let season = require_season(cfg.season_or_default(season))?;
      store.add_person_to_season(person, season).await?;
      json!({ "person_id": person, "season": season })
    }
    PersonCommand::Unenroll { person, season } => {
      let season = require_season(cfg.season_or_default(season))?;
      store
        .remove_person_from_season(person, season)
        .await
        .with_context(|| format!("removing person {person} from season {season}"))?;
      json!({ "person_id": person, "season": season })
    }
    PersonCommand::Partner { person, with, season } => {
      let season = require_season(cfg.season_or_default(season))?;
      store
        .set_partner(person, with, season)
        .await
        .with_context(|| format!("setting partner of {person} in season {season}"))?;
      json!({ "person_id": person, "partner_person_id": with, "season": season })
    }
  };
  Ok(value)
}

async fn run_season<S: CompatStore>(store: &S, command: SeasonCommand) -> Result<Value> {
  let value = match command {
    SeasonCommand::Upsert { season, air_date, filming_date } => {
      let season = Season { season, air_date, filming_date };
      store.upsert_season(season.clone()).await?;
      serde_json::to_value(season)?
    }
    SeasonCommand::List => {
      let mut seasons = Vec::new();
      for season in store.list_seasons().await? {
        if let Some(s) = store.get_season(season).await? {
          seasons.push(s);
        }
      }
      serde_json::to_value(seasons)?
    }
  };
  Ok(value)
}

async fn run_rating_type<S: CompatStore>(store: &S, command: RatingTypeCommand) -> Result<Value> {
  let value = match command {
    RatingTypeCommand::Add { name, weight, category } => {
      serde_json::to_value(store.add_rating_type(NewRatingType { name, weight, category }).await?)?
    }
    RatingTypeCommand::List => serde_json::to_value(store.list_rating_types().await?)?,
    RatingTypeCommand::Weight { rating_type, weight } => {
      store.update_rating_weight(rating_type, weight).await?;
      json!({ "rating_type_id": rating_type, "weight": weight })
    }
    RatingTypeCommand::Rename { rating_type, name } => {
      store.rename_rating_type(rating_type, name.clone()).await?;
      json!({ "rating_type_id": rating_type, "name": name })
    }
    RatingTypeCommand::Delete { rating_type } => {
      store
        .delete_rating_type(rating_type)
        .await
        .with_context(|| format!("deleting rating type {rating_type}"))?;
      json!({ "deleted": rating_type })
    }
  };
  Ok(value)
}

async fn run_roster<S: CompatStore>(
  store: &S,
  cfg: &CliConfig,
  command: RosterCommand,
) -> Result<Value> {
  let value = match command {
    RosterCommand::People { season } => {
      serde_json::to_value(store.get_people(cfg.season_or_default(season)).await?)?
    }
    RosterCommand::PeopleRatings { season } => {
      serde_json::to_value(store.get_people_with_ratings(cfg.season_or_default(season)).await?)?
    }
    RosterCommand::Relationships { season } => {
      serde_json::to_value(store.get_relationships(cfg.season_or_default(season)).await?)?
    }
    RosterCommand::RelationshipRatings { season } => serde_json::to_value(
      store
        .get_relationships_with_ratings(cfg.season_or_default(season))
        .await?,
    )?,
  };
  Ok(value)
}
