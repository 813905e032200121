use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ranking::RankedPrediction;
use crate::models::WagerFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WagerOutcome {
    Winner { prediction_id: Uuid, user_id: Uuid },
    NoWinner,
}

impl WagerOutcome {
    pub fn winning_prediction(&self) -> Option<Uuid> {
        match self {
            Self::Winner { prediction_id, .. } => Some(*prediction_id),
            Self::NoWinner => None,
        }
    }

    pub fn is_winner(&self, prediction_id: Uuid) -> bool {
        self.winning_prediction() == Some(prediction_id)
    }
}

/// Users who play for coffee, built from membership flags.
///
/// Users without a membership row are simply absent, which makes them
/// ineligible.
pub fn opted_in_users<'a>(flags: impl IntoIterator<Item = &'a WagerFlag>) -> HashSet<Uuid> {
    flags
        .into_iter()
        .filter(|flag| flag.wager_opt_in)
        .map(|flag| flag.user_id)
        .collect()
}

/// The best-ranked prediction owned by an opted-in user wins the wager.
///
/// `ranked` must already be in rank order. This is independent of overall
/// rank 1: the best predictor may not be playing for coffee.
pub fn resolve_wager(ranked: &[RankedPrediction], opted_in: &HashSet<Uuid>) -> WagerOutcome {
    ranked
        .iter()
        .find(|prediction| opted_in.contains(&prediction.user_id))
        .map_or(WagerOutcome::NoWinner, |winner| WagerOutcome::Winner {
            prediction_id: winner.prediction_id,
            user_id: winner.user_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scoring::Pick;
    use proptest::prelude::*;

    fn ranked(n: u128, rank: u32) -> RankedPrediction {
        RankedPrediction {
            prediction_id: Uuid::from_u128(n),
            user_id: Uuid::from_u128(1000 + n),
            delta: u64::from(rank),
            pick: Pick::Home,
            picked_winner: true,
            rank,
        }
    }

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(1000 + n)
    }

    #[test]
    fn test_first_opted_in_user_wins() {
        let list = [ranked(1, 1), ranked(2, 2), ranked(3, 3)];
        let opted_in = HashSet::from([user(2), user(3)]);

        assert_eq!(
            resolve_wager(&list, &opted_in),
            WagerOutcome::Winner {
                prediction_id: Uuid::from_u128(2),
                user_id: user(2),
            }
        );
    }

    #[test]
    fn test_no_opted_in_user_means_no_winner() {
        let list = [ranked(1, 1), ranked(2, 2)];
        let outcome = resolve_wager(&list, &HashSet::new());

        assert_eq!(outcome, WagerOutcome::NoWinner);
        assert!(!outcome.is_winner(Uuid::from_u128(1)));
    }

    #[test]
    fn test_empty_ranking_means_no_winner() {
        assert_eq!(
            resolve_wager(&[], &HashSet::from([user(1)])),
            WagerOutcome::NoWinner
        );
    }

    #[test]
    fn test_opted_in_users_filters_flags() {
        let flags = [
            WagerFlag { user_id: user(1), wager_opt_in: true },
            WagerFlag { user_id: user(2), wager_opt_in: false },
        ];
        assert_eq!(opted_in_users(&flags), HashSet::from([user(1)]));
    }

    proptest! {
        #[test]
        fn winner_is_always_opted_in_and_best_ranked(
            size in 0usize..30,
            opted in prop::collection::hash_set(0u128..30, 0..30),
        ) {
            let list: Vec<_> = (0..size as u128).map(|n| ranked(n, n as u32 + 1)).collect();
            let opted_in: HashSet<Uuid> = opted.iter().map(|n| user(*n)).collect();

            match resolve_wager(&list, &opted_in) {
                WagerOutcome::Winner { user_id, prediction_id } => {
                    prop_assert!(opted_in.contains(&user_id));
                    let winner = list.iter().find(|p| p.prediction_id == prediction_id).unwrap();
                    prop_assert!(list
                        .iter()
                        .filter(|p| p.rank < winner.rank)
                        .all(|p| !opted_in.contains(&p.user_id)));
                }
                WagerOutcome::NoWinner => {
                    prop_assert!(list.iter().all(|p| !opted_in.contains(&p.user_id)));
                }
            }
        }
    }
}
