use crate::{
    database::db_structs::StoredRating,
    model::{
        constants::{INITIAL_RATING, INITIAL_VOLATILITY},
        structures::{participant::Participant, rating_type::RatingType}
    },
    submissions::{FinalScore, ReviewSummation, Submission}
};
use chrono::{DateTime, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

pub fn generate_participant(member_id: i32, score: f64, rating: f64, volatility: f64, ratings_count: i32) -> Participant {
    Participant {
        member_id,
        score,
        rating,
        volatility,
        ratings_count,
        winner_count: 0
    }
}

/// A roster of never-rated members with ids `1..`, one per score.
pub fn first_timers(scores: &[f64]) -> Vec<Participant> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| generate_participant(i as i32 + 1, score, INITIAL_RATING, INITIAL_VOLATILITY, 0))
        .collect()
}

/// A reproducible roster of `n` members with mixed histories.
/// Scores are drawn from a narrow integer range so ties are common.
pub fn generate_roster(seed: u64, n: usize) -> Vec<Participant> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|i| {
            let ratings_count = rng.random_range(0..=40);
            let (rating, volatility) = if ratings_count == 0 {
                (INITIAL_RATING, INITIAL_VOLATILITY)
            } else {
                (rng.random_range(100.0..3500.0), rng.random_range(80.0..600.0))
            };
            let score = rng.random_range(0..=(n as i32 / 2).max(1)) as f64;

            Participant {
                member_id: i as i32 + 1,
                score,
                rating,
                volatility,
                ratings_count,
                winner_count: rng.random_range(0..=ratings_count)
            }
        })
        .collect()
}

pub fn generate_stored_rating(
    member_id: i32,
    rating: i32,
    volatility: i32,
    ratings_count: i32,
    total_wins: i32
) -> StoredRating {
    StoredRating {
        member_id,
        rating_type: RatingType::Marathon,
        challenge_id: None,
        win_position: None,
        total_wins,
        rating,
        volatility,
        ratings_count
    }
}

pub fn generate_final_score(member_id: i32, score: f64) -> FinalScore {
    FinalScore {
        member_id,
        submission_id: Uuid::new_v4(),
        score
    }
}

/// Fixed reference instant for submission timelines.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn generate_review(aggregate_score: f64, created: DateTime<Utc>) -> ReviewSummation {
    ReviewSummation {
        aggregate_score,
        created
    }
}

pub fn generate_submission(member_id: i32, created: DateTime<Utc>, reviews: Vec<ReviewSummation>) -> Submission {
    Submission {
        id: Uuid::new_v4(),
        member_id,
        created,
        review_summation: Some(reviews)
    }
}
