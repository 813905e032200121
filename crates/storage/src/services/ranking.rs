use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::scoring::{self, Pick};
use crate::models::{PartialScore, Prediction, Score};

/// Ranking was asked for a game whose final score is not fully known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Game final score is incomplete")]
pub struct IncompleteGame;

/// A prediction entering the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contender {
    pub prediction_id: Uuid,
    pub user_id: Uuid,
    pub score: Score,
}

impl From<&Prediction> for Contender {
    fn from(prediction: &Prediction) -> Self {
        Self {
            prediction_id: prediction.prediction_id,
            user_id: prediction.user_id,
            score: prediction.predicted_score(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub prediction_id: Uuid,
    pub user_id: Uuid,
    pub delta: u64,
    pub pick: Pick,
    pub picked_winner: bool,
    /// 1-based position, unique within one game and group
    pub rank: u32,
}

/// Orders predictions by accuracy and assigns dense ranks.
///
/// The sort key is `(delta, !picked_winner)`: closest total first, and on an
/// equal delta the prediction that called the right side goes first. The sort
/// is stable, so predictions tied on both keys keep their input order and
/// still get distinct sequential ranks.
pub fn rank_predictions(
    contenders: &[Contender],
    actual: PartialScore,
) -> Result<Vec<RankedPrediction>, IncompleteGame> {
    let actual = actual.complete().ok_or(IncompleteGame)?;

    let mut scored: Vec<RankedPrediction> = contenders
        .iter()
        .map(|c| RankedPrediction {
            prediction_id: c.prediction_id,
            user_id: c.user_id,
            delta: scoring::delta(c.score, actual),
            pick: scoring::pick(c.score),
            picked_winner: scoring::matches_actual(c.score, actual),
            rank: 0,
        })
        .collect();

    scored.sort_by_key(|p| (p.delta, !p.picked_winner));

    for (position, prediction) in (1u32..).zip(scored.iter_mut()) {
        prediction.rank = position;
    }

    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn contender(n: u128, home: i32, away: i32) -> Contender {
        Contender {
            prediction_id: Uuid::from_u128(n),
            user_id: Uuid::from_u128(1000 + n),
            score: Score::new(home, away),
        }
    }

    fn final_score(home: i32, away: i32) -> PartialScore {
        Score::new(home, away).into()
    }

    fn ids(ranked: &[RankedPrediction]) -> Vec<u128> {
        ranked.iter().map(|r| r.prediction_id.as_u128()).collect()
    }

    #[test]
    fn test_closest_prediction_ranks_first() {
        let contenders = [contender(3, 17, 24), contender(2, 21, 14), contender(1, 24, 17)];
        let ranked = rank_predictions(&contenders, final_score(24, 17)).unwrap();

        assert_eq!(ids(&ranked), vec![1, 2, 3]);
        assert_eq!(ranked.iter().map(|r| r.delta).collect::<Vec<_>>(), vec![0, 6, 14]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(ranked[1].picked_winner);
        assert!(!ranked[2].picked_winner);
    }

    #[test]
    fn test_equal_delta_prefers_correct_winner() {
        // Both are 4 off a 20-17 final; only the second called the home win.
        let contenders = [contender(1, 17, 18), contender(2, 22, 19)];
        let ranked = rank_predictions(&contenders, final_score(20, 17)).unwrap();

        assert_eq!(ranked[0].delta, ranked[1].delta);
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn test_full_tie_keeps_input_order_with_distinct_ranks() {
        let contenders = [contender(1, 9, 11), contender(2, 11, 9)];
        let ranked = rank_predictions(&contenders, final_score(10, 10)).unwrap();

        assert_eq!(ids(&ranked), vec![1, 2]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_smaller_delta_beats_correct_pick() {
        // 1 off with the wrong side still beats 3 off with the right side.
        let contenders = [contender(1, 24, 20), contender(2, 20, 21)];
        let ranked = rank_predictions(&contenders, final_score(21, 20)).unwrap();

        assert_eq!(ids(&ranked), vec![2, 1]);
        assert!(!ranked[0].picked_winner);
    }

    #[test]
    fn test_empty_input() {
        let ranked = rank_predictions(&[], final_score(3, 0)).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_refuses_incomplete_score() {
        let contenders = [contender(1, 3, 0)];
        assert_eq!(
            rank_predictions(&contenders, PartialScore::new(Some(3), None)),
            Err(IncompleteGame)
        );
        assert_eq!(
            rank_predictions(&[], PartialScore::default()),
            Err(IncompleteGame)
        );
    }

    #[test]
    fn test_scoreless_final_is_rankable() {
        let contenders = [contender(1, 3, 0), contender(2, 0, 0)];
        let ranked = rank_predictions(&contenders, final_score(0, 0)).unwrap();

        assert_eq!(ids(&ranked), vec![2, 1]);
        assert_eq!(ranked[0].delta, 0);
    }

    fn contenders_strategy() -> impl Strategy<Value = Vec<Contender>> {
        prop::collection::vec((0i32..60, 0i32..60), 0..40).prop_map(|scores| {
            scores
                .into_iter()
                .enumerate()
                .map(|(i, (home, away))| contender(i as u128, home, away))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn ranks_are_a_permutation(contenders in contenders_strategy(), home in 0i32..60, away in 0i32..60) {
            let ranked = rank_predictions(&contenders, final_score(home, away)).unwrap();
            prop_assert_eq!(ranked.len(), contenders.len());
            let ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
            let expected: Vec<u32> = (1..=contenders.len() as u32).collect();
            prop_assert_eq!(ranks, expected);
        }

        #[test]
        fn ordering_respects_tie_break_keys(contenders in contenders_strategy(), home in 0i32..60, away in 0i32..60) {
            let ranked = rank_predictions(&contenders, final_score(home, away)).unwrap();
            for pair in ranked.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                prop_assert!(a.delta <= b.delta);
                if a.delta == b.delta {
                    prop_assert!(a.picked_winner || !b.picked_winner);
                    if a.picked_winner == b.picked_winner {
                        // ids were assigned in input order
                        prop_assert!(a.prediction_id < b.prediction_id);
                    }
                }
            }
        }

        #[test]
        fn ranking_is_deterministic(contenders in contenders_strategy(), home in 0i32..60, away in 0i32..60) {
            let first = rank_predictions(&contenders, final_score(home, away)).unwrap();
            let second = rank_predictions(&contenders, final_score(home, away)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
