//! Weighted score aggregation.
//!
//! The score of a subject is the weight-normalised average of its present
//! rating values. Arithmetic is exact decimal, so the result depends only on
//! the inputs and never on the order of the rating-type list.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  rating::{RatingType, RatingTypeId, RatingsByType},
};

/// The result of [`compute_score`], with enough context to render a
/// per-component breakdown without another query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  /// `None` when nothing contributed (no present values, or zero total
  /// weight). Never a misleading zero.
  pub score:   Option<Decimal>,
  /// The rating mapping the score was computed from.
  pub ratings: RatingsByType,
  /// Weight of every known rating type, keyed by id.
  pub weights: BTreeMap<RatingTypeId, Decimal>,
}

/// Compute the weighted average of `ratings` against `rating_types`.
///
/// Iterates the rating-type definitions; a type with no entry in `ratings`,
/// or an entry of `None`, contributes to neither sum. Entries for unknown
/// rating types are ignored.
///
/// Fails with [`Error::ScoreOverflow`] if an intermediate sum, product or the
/// final quotient leaves the 96-bit decimal range.
pub fn compute_score(
  ratings: &RatingsByType,
  rating_types: &[RatingType],
) -> Result<ScoreBreakdown> {
  let mut total_weighted = Decimal::ZERO;
  let mut total_weight = Decimal::ZERO;

  for rt in rating_types {
    let Some(Some(value)) = ratings.get(&rt.rating_type_id) else {
      continue;
    };
    total_weighted = value
      .checked_mul(rt.weight)
      .and_then(|product| total_weighted.checked_add(product))
      .ok_or(Error::ScoreOverflow)?;
    total_weight = total_weight
      .checked_add(rt.weight)
      .ok_or(Error::ScoreOverflow)?;
  }

  let score = if total_weight.is_zero() {
    None
  } else {
    Some(
      total_weighted
        .checked_div(total_weight)
        .ok_or(Error::ScoreOverflow)?,
    )
  };

  let weights = rating_types
    .iter()
    .map(|rt| (rt.rating_type_id, rt.weight))
    .collect();

  Ok(ScoreBreakdown { score, ratings: ratings.clone(), weights })
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  fn rt(id: RatingTypeId, weight: i64) -> RatingType {
    RatingType {
      rating_type_id: id,
      name:           format!("type {id}"),
      weight:         Decimal::from(weight),
      category:       "general".into(),
    }
  }

  fn ratings(entries: &[(RatingTypeId, Option<i64>)]) -> RatingsByType {
    entries
      .iter()
      .map(|(id, v)| (*id, v.map(Decimal::from)))
      .collect()
  }

  #[test]
  fn absent_value_does_not_contribute() {
    let types = [rt(1, 2), rt(2, 1)];
    let result = compute_score(&ratings(&[(1, Some(8)), (2, None)]), &types).unwrap();
    assert_eq!(result.score, Some(Decimal::from(8)));
  }

  #[test]
  fn weighted_average_is_exact_decimal() {
    let types = [rt(1, 2), rt(2, 1)];
    let result = compute_score(&ratings(&[(1, Some(8)), (2, Some(4))]), &types).unwrap();
    assert_eq!(result.score, Some(Decimal::from(20) / Decimal::from(3)));
  }

  #[test]
  fn missing_key_and_none_are_equivalent_but_zero_is_not() {
    let types = [rt(1, 1), rt(2, 1)];

    let missing = compute_score(&ratings(&[(1, Some(6))]), &types).unwrap();
    let none = compute_score(&ratings(&[(1, Some(6)), (2, None)]), &types).unwrap();
    let zero = compute_score(&ratings(&[(1, Some(6)), (2, Some(0))]), &types).unwrap();

    assert_eq!(missing.score, Some(Decimal::from(6)));
    assert_eq!(none.score, missing.score);
    assert_eq!(zero.score, Some(Decimal::from(3)));
  }

  #[test]
  fn no_ratings_means_no_score() {
    let types = [rt(1, 2), rt(2, 1)];
    assert_eq!(compute_score(&RatingsByType::new(), &types).unwrap().score, None);
    assert_eq!(
      compute_score(&ratings(&[(1, None), (2, None)]), &types).unwrap().score,
      None
    );
  }

  #[test]
  fn zero_total_weight_means_no_score() {
    let types = [rt(1, 0), rt(2, 0)];
    let result = compute_score(&ratings(&[(1, Some(9)), (2, Some(3))]), &types).unwrap();
    assert_eq!(result.score, None);
  }

  #[test]
  fn unknown_rating_type_is_ignored() {
    let types = [rt(1, 1)];
    let result = compute_score(&ratings(&[(1, Some(5)), (99, Some(1))]), &types).unwrap();
    assert_eq!(result.score, Some(Decimal::from(5)));
  }

  #[test]
  fn echoes_ratings_and_weights() {
    let types = [rt(1, 2), rt(2, 1)];
    let input = ratings(&[(1, Some(8)), (2, None)]);
    let result = compute_score(&input, &types).unwrap();

    assert_eq!(result.ratings, input);
    assert_eq!(result.weights.get(&1), Some(&Decimal::from(2)));
    assert_eq!(result.weights.get(&2), Some(&Decimal::from(1)));
  }

  #[test]
  fn overflow_is_reported_not_panicked() {
    let types = [rt(1, 2)];
    let huge: RatingsByType = [(1, Some(Decimal::MAX))].into_iter().collect();
    assert!(matches!(compute_score(&huge, &types), Err(Error::ScoreOverflow)));

    let types = [rt(1, 1), rt(2, 1)];
    let both: RatingsByType =
      [(1, Some(Decimal::MAX)), (2, Some(Decimal::MAX))].into_iter().collect();
    assert!(matches!(compute_score(&both, &types), Err(Error::ScoreOverflow)));
  }

  #[test]
  fn largest_value_at_unit_weight_still_scores() {
    let types = [rt(1, 1)];
    let max: RatingsByType = [(1, Some(Decimal::MAX))].into_iter().collect();
    assert_eq!(compute_score(&max, &types).unwrap().score, Some(Decimal::MAX));
  }

  proptest! {
    #[test]
    fn score_is_invariant_under_type_reordering(
      entries in proptest::collection::vec(
        (0i64..20, proptest::option::of(-100i64..100)),
        0..12,
      ),
      rotate in 0usize..12,
    ) {
      let mut types: Vec<RatingType> = entries
        .iter()
        .enumerate()
        .map(|(i, (w, _))| rt(i as RatingTypeId, *w))
        .collect();
      let values: RatingsByType = entries
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as RatingTypeId, v.map(Decimal::from)))
        .collect();

      let forward = compute_score(&values, &types).unwrap();

      types.reverse();
      let reversed = compute_score(&values, &types).unwrap();
      if !types.is_empty() {
        let k = rotate % types.len();
        types.rotate_left(k);
      }
      let rotated = compute_score(&values, &types).unwrap();

      prop_assert_eq!(forward.score, reversed.score);
      prop_assert_eq!(forward.score, rotated.score);
    }
  }
}
