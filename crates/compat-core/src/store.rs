//! The `CompatStore` trait — the service contract of the engine.
//!
//! The trait is implemented by storage backends (e.g. `compat-store-sqlite`).
//! Every multi-step mutation (partner unassignment, season removal, rating
//! type deletion) must be applied atomically by the backend: either every
//! write lands or none does.

use std::future::Future;

use rust_decimal::Decimal;

use crate::{
  person::{NewPerson, Person, PersonId},
  rating::{NewRatingType, RatingSubject, RatingType, RatingTypeId},
  relationship::{Relationship, RelationshipId},
  roster::{
    PersonRatingView, PersonView, RelationshipDetails, RelationshipRatingView,
    RelationshipView,
  },
  season::{Season, SeasonNum},
};

/// Abstraction over a compatibility store backend.
///
/// Operations that clean up (removing a membership, unassigning a partner,
/// removing a rating) succeed with no effect when there is nothing to remove.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait CompatStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Persist a new person and return it with its assigned id.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Overwrite every field of an existing person. Fails if it does not exist.
  fn update_person(
    &self,
    person_id: PersonId,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Delete a person. Memberships, ratings and relationships involving the
  /// person are removed by the backend's own constraints. No-op if absent.
  fn delete_person(
    &self,
    person_id: PersonId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_person(
    &self,
    person_id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// All people ordered by first name, then last name.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn update_person_image_path(
    &self,
    person_id: PersonId,
    image_path: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Seasons ───────────────────────────────────────────────────────────

  fn upsert_season(
    &self,
    season: Season,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_season(
    &self,
    season: SeasonNum,
  ) -> impl Future<Output = Result<Option<Season>, Self::Error>> + Send + '_;

  /// All season numbers in ascending order.
  fn list_seasons(
    &self,
  ) -> impl Future<Output = Result<Vec<SeasonNum>, Self::Error>> + Send + '_;

  // ── Membership and partner graph ──────────────────────────────────────

  /// Enrol a person in a season. Idempotent; fails if the person is unknown.
  fn add_person_to_season(
    &self,
    person_id: PersonId,
    season: SeasonNum,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a person's membership of `season` with everything scoped to it:
  /// their ratings for the season, the season links of every relationship
  /// involving them (with those relationships' ratings for the season), and
  /// any relationship left without a season link.
  fn remove_person_from_season(
    &self,
    person_id: PersonId,
    season: SeasonNum,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Assign (`Some`) or clear (`None`) a person's partner for `season`.
  ///
  /// Assigning reuses the one relationship that exists for the unordered
  /// pair, creating it if needed, and links it to the season. Clearing
  /// unlinks every relationship of the person in the season and deletes the
  /// ones left orphaned.
  fn set_partner(
    &self,
    person_id: PersonId,
    partner_id: Option<PersonId>,
    season: SeasonNum,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The person linked to `person_id` in `season`, looked up from either
  /// side of the pair.
  fn get_partner(
    &self,
    person_id: PersonId,
    season: SeasonNum,
  ) -> impl Future<Output = Result<Option<PersonId>, Self::Error>> + Send + '_;

  // ── Relationships ─────────────────────────────────────────────────────

  fn get_relationship(
    &self,
    relationship_id: RelationshipId,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  fn update_relationship_image_path(
    &self,
    relationship_id: RelationshipId,
    image_path: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Rating types ──────────────────────────────────────────────────────

  fn add_rating_type(
    &self,
    input: NewRatingType,
  ) -> impl Future<Output = Result<RatingType, Self::Error>> + Send + '_;

  /// All rating types ordered by name.
  fn list_rating_types(
    &self,
  ) -> impl Future<Output = Result<Vec<RatingType>, Self::Error>> + Send + '_;

  fn update_rating_type(
    &self,
    rating_type_id: RatingTypeId,
    input: NewRatingType,
  ) -> impl Future<Output = Result<RatingType, Self::Error>> + Send + '_;

  fn update_rating_weight(
    &self,
    rating_type_id: RatingTypeId,
    weight: Decimal,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn rename_rating_type(
    &self,
    rating_type_id: RatingTypeId,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a rating type together with every person and relationship
  /// rating that uses it, in one transaction. No-op if absent.
  fn delete_rating_type(
    &self,
    rating_type_id: RatingTypeId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Ratings ───────────────────────────────────────────────────────────

  /// Insert or overwrite a person's rating for `season`, enrolling the
  /// person in the season if needed. `value` and `season` are required.
  fn upsert_person_rating(
    &self,
    person_id: PersonId,
    rating_type_id: RatingTypeId,
    value: Option<Decimal>,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert or overwrite a relationship's rating for `season`, linking the
  /// relationship to the season if needed. `value` and `season` are
  /// required.
  fn upsert_relationship_rating(
    &self,
    relationship_id: RelationshipId,
    rating_type_id: RatingTypeId,
    value: Option<Decimal>,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a subject's rating of one type, in `season` or, when `None`, in
  /// every season.
  fn remove_rating(
    &self,
    subject: RatingSubject,
    rating_type_id: RatingTypeId,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Rosters ───────────────────────────────────────────────────────────

  fn get_people(
    &self,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<Vec<PersonView>, Self::Error>> + Send + '_;

  fn get_people_with_ratings(
    &self,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<Vec<PersonRatingView>, Self::Error>> + Send + '_;

  fn get_relationships(
    &self,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<Vec<RelationshipView>, Self::Error>> + Send + '_;

  fn get_relationships_with_ratings(
    &self,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<Vec<RelationshipRatingView>, Self::Error>>
  + Send
  + '_;

  /// The relationship, both people (with ratings) and the rating-type table.
  /// Returns `None` if the relationship is not on the roster for `season`.
  fn get_relationship_details(
    &self,
    relationship_id: RelationshipId,
    season: Option<SeasonNum>,
  ) -> impl Future<Output = Result<Option<RelationshipDetails>, Self::Error>>
  + Send
  + '_;
}
