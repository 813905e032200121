use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Score;

/// Total points off: `|home - home'| + |away - away'|`.
///
/// Widened to `u64` so the sum cannot overflow for any pair of `i32` scores.
/// Lower is better and zero means a perfect prediction.
pub fn delta(predicted: Score, actual: Score) -> u64 {
    u64::from(actual.home.abs_diff(predicted.home)) + u64::from(actual.away.abs_diff(predicted.away))
}

/// Which side a score favors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    Home,
    Away,
    Tie,
}

pub fn pick(score: Score) -> Pick {
    match score.home.cmp(&score.away) {
        Ordering::Greater => Pick::Home,
        Ordering::Less => Pick::Away,
        Ordering::Equal => Pick::Tie,
    }
}

/// A tie prediction only matches an actual tie.
pub fn matches_actual(predicted: Score, actual: Score) -> bool {
    pick(predicted) == pick(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_delta_sums_both_sides() {
        assert_eq!(delta(Score::new(24, 17), Score::new(24, 17)), 0);
        assert_eq!(delta(Score::new(21, 14), Score::new(24, 17)), 6);
        assert_eq!(delta(Score::new(17, 24), Score::new(24, 17)), 14);
    }

    #[test]
    fn test_delta_at_integer_extremes() {
        let d = delta(Score::new(i32::MIN, i32::MIN), Score::new(i32::MAX, i32::MAX));
        assert_eq!(d, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_pick() {
        assert_eq!(pick(Score::new(24, 17)), Pick::Home);
        assert_eq!(pick(Score::new(17, 24)), Pick::Away);
        assert_eq!(pick(Score::new(10, 10)), Pick::Tie);
        assert_eq!(pick(Score::new(0, 0)), Pick::Tie);
    }

    #[test]
    fn test_tie_prediction_matches_only_a_tie() {
        let tie = Score::new(14, 14);
        assert!(matches_actual(tie, Score::new(3, 3)));
        assert!(!matches_actual(tie, Score::new(3, 0)));
        assert!(!matches_actual(Score::new(11, 9), Score::new(10, 10)));
    }

    #[test]
    fn test_correct_side_matches_regardless_of_margin() {
        assert!(matches_actual(Score::new(50, 0), Score::new(21, 20)));
        assert!(!matches_actual(Score::new(20, 21), Score::new(21, 20)));
    }

    fn any_score() -> impl Strategy<Value = Score> {
        (any::<i32>(), any::<i32>()).prop_map(|(home, away)| Score::new(home, away))
    }

    proptest! {
        #[test]
        fn delta_is_zero_only_for_exact_match(p in any_score(), a in any_score()) {
            prop_assert_eq!(delta(p, a) == 0, p == a);
        }

        #[test]
        fn delta_is_symmetric(p in any_score(), a in any_score()) {
            prop_assert_eq!(delta(p, a), delta(a, p));
        }

        #[test]
        fn delta_satisfies_triangle_inequality(
            a in (0i32..200, 0i32..200),
            b in (0i32..200, 0i32..200),
            c in (0i32..200, 0i32..200),
        ) {
            let (a, b, c) = (Score::new(a.0, a.1), Score::new(b.0, b.1), Score::new(c.0, c.1));
            prop_assert!(delta(a, c) <= delta(a, b) + delta(b, c));
        }

        #[test]
        fn matches_actual_is_reflexive(s in any_score()) {
            prop_assert!(matches_actual(s, s));
        }
    }
}
