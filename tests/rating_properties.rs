//! Property tests for the Elo vote calculation

use proptest::prelude::*;
use vote4goat::rating::{EloRatingCalculator, ExtendedEloConfig, RatingCalculator};

fn calculator(k_factor: f64) -> EloRatingCalculator {
    EloRatingCalculator::new(ExtendedEloConfig::new(k_factor, 1500.0)).unwrap()
}

proptest! {
    #[test]
    fn vote_is_zero_sum(
        winner in 0.0f64..3000.0,
        loser in 0.0f64..3000.0,
        k_factor in 1.0f64..64.0,
    ) {
        let result = calculator(k_factor).calculate_vote((1, winner), (2, loser)).unwrap();
        prop_assert!(result.net_change().abs() < 1e-9);
    }

    #[test]
    fn winner_gains_at_most_k(
        winner in 0.0f64..3000.0,
        loser in 0.0f64..3000.0,
    ) {
        let result = calculator(32.0).calculate_vote((1, winner), (2, loser)).unwrap();
        prop_assert!(result.winner.delta() > 0.0);
        prop_assert!(result.winner.delta() <= 32.0);
        prop_assert!(result.loser.delta() < 0.0);
    }

    #[test]
    fn underdog_gains_at_least_half_k(
        winner in 0.0f64..3000.0,
        gap in 0.0f64..1000.0,
    ) {
        let loser = winner + gap;
        let result = calculator(32.0).calculate_vote((1, winner), (2, loser)).unwrap();
        prop_assert!(result.winner.delta() >= 16.0 - 1e-9);
    }

    #[test]
    fn expected_scores_are_complementary(
        rating in 0.0f64..3000.0,
        opponent in 0.0f64..3000.0,
    ) {
        let calc = calculator(32.0);
        let forward = calc.expected_score(rating, opponent);
        let backward = calc.expected_score(opponent, rating);
        prop_assert!((forward + backward - 1.0).abs() < 1e-9);
        prop_assert!(forward > 0.0 && forward < 1.0);
    }

    #[test]
    fn winner_delta_matches_expected_score(
        winner in 0.0f64..3000.0,
        loser in 0.0f64..3000.0,
    ) {
        let result = calculator(32.0).calculate_vote((1, winner), (2, loser)).unwrap();
        let predicted = 32.0 * (1.0 - result.winner_expected_score);
        prop_assert!((result.winner.delta() - predicted).abs() < 1e-9);
    }
}
