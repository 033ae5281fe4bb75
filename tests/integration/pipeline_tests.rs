use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use mm_rating_processor::{
    model::{calculate, constants::RatingConstants, structures::rating_type::RatingType},
    processor::{build_roster, history_records, rate_event, rating_updates},
    submissions::final_scores,
    utils::test_utils::{base_time, generate_review, generate_stored_rating, generate_submission}
};
use uuid::Uuid;

use crate::common::init_test_env;

#[test]
fn test_submissions_to_rows() {
    init_test_env();
    let t = base_time();
    let submissions = vec![
        generate_submission(1, t, vec![generate_review(92.0, t)]),
        generate_submission(2, t, vec![generate_review(75.5, t)]),
        generate_submission(3, t, vec![generate_review(75.5, t)]),
        generate_submission(4, t, vec![generate_review(-1.0, t)]),
        generate_submission(5, t, vec![generate_review(12.0, t)]),
    ];
    let priors = HashMap::from([
        (1, generate_stored_rating(1, 2300, 210, 25, 6)),
        (3, generate_stored_rating(3, 1450, 330, 3, 0)),
    ]);
    let constants = RatingConstants::default();
    let event_id = Uuid::new_v4();

    let scores = final_scores(&submissions).unwrap();
    assert_eq!(scores.iter().map(|s| s.member_id).collect::<Vec<_>>(), vec![5, 2, 3, 1]);

    let roster = build_roster(&scores, &priors, &constants).unwrap();
    let outcome = calculate(&roster, &constants).unwrap();

    let ratings = rating_updates(&outcome, event_id, RatingType::Marathon);
    let history = history_records(&outcome, &scores, event_id, RatingType::Marathon).unwrap();

    assert_eq!(ratings.len(), 4);
    assert_eq!(history.len(), 4);

    // Members 2 and 3 tie for second
    let tied: Vec<_> = outcome
        .participants
        .iter()
        .filter(|p| p.member_id() == 2 || p.member_id() == 3)
        .collect();
    for p in &tied {
        assert_abs_diff_eq!(p.placement.actual_rank, 2.5);
        assert_eq!(p.placement.position, 2);
    }

    let leader = outcome.get(1).unwrap();
    assert!(leader.is_winner());
    assert_eq!(leader.winner_count, 7);
    assert_eq!(outcome.winners().count(), 1);

    // Expected ranks always add up to the triangular number of the field size
    let expected_sum: f64 = outcome.participants.iter().map(|p| p.expectation.expected_rank).sum();
    assert_abs_diff_eq!(expected_sum, 10.0, epsilon = 1e-9);

    for rating in &ratings {
        assert_eq!(rating.challenge_id, Some(event_id));
        assert!(rating.rating >= 1);
        assert!(rating.volatility > 0);
    }
    for record in &history {
        let prior = roster.iter().find(|p| p.member_id == record.member_id).unwrap();
        assert_eq!(record.rating as f64, prior.rating);
        assert_eq!(record.score, prior.score);
    }
}

#[test]
fn test_rate_event_matches_manual_pipeline() {
    init_test_env();
    let t = base_time();
    let submissions: Vec<_> = (1..=12)
        .map(|id| generate_submission(id, t, vec![generate_review((id % 5) as f64 * 10.0, t)]))
        .collect();
    let priors = HashMap::from([(4, generate_stored_rating(4, 1900, 260, 11, 2))]);
    let constants = RatingConstants::default();
    let event_id = Uuid::new_v4();

    let scores = final_scores(&submissions).unwrap();
    let processed = rate_event(event_id, RatingType::Marathon, &scores, &priors, &constants).unwrap();

    let roster = build_roster(&scores, &priors, &constants).unwrap();
    let outcome = calculate(&roster, &constants).unwrap();

    assert_eq!(processed.outcome, outcome);
    assert_eq!(processed.ratings, rating_updates(&outcome, event_id, RatingType::Marathon));
}

#[test]
fn test_everyone_tied_moves_only_on_expectation() {
    init_test_env();
    let t = base_time();
    let submissions: Vec<_> = (1..=4)
        .map(|id| generate_submission(id, t, vec![generate_review(50.0, t)]))
        .collect();
    let constants = RatingConstants::default();

    let scores = final_scores(&submissions).unwrap();
    let roster = build_roster(&scores, &HashMap::new(), &constants).unwrap();
    let outcome = calculate(&roster, &constants).unwrap();

    // Equal priors and a full tie leave every rating where it was
    for p in &outcome.participants {
        assert_abs_diff_eq!(p.placement.actual_rank, 2.5);
        assert_eq!(p.new_rating, 1200);
        assert_eq!(p.new_volatility, 385);
        assert!(!p.is_winner());
    }
}
