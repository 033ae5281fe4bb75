use tracing::trace;

use super::{
    constants::RatingConstants,
    structures::participant::{Expectation, Participant, Placement, RatedParticipant}
};

/// Applies the rating law to every participant.
///
/// `expectations` and `placements` must be computed from the same `roster`
/// and be in the same order.
pub fn update_ratings(
    roster: &[Participant],
    expectations: &[Expectation],
    placements: &[Placement],
    competition_factor: f64,
    constants: &RatingConstants
) -> Vec<RatedParticipant> {
    roster
        .iter()
        .zip(expectations)
        .zip(placements)
        .map(|((participant, expectation), placement)| {
            rate(participant, *expectation, *placement, competition_factor, constants)
        })
        .collect()
}

fn rate(
    participant: &Participant,
    expectation: Expectation,
    placement: Placement,
    competition_factor: f64,
    constants: &RatingConstants
) -> RatedParticipant {
    let old_rating = participant.rating;
    let diff = placement.actual_performance - expectation.expected_performance;
    let performed_as = old_rating + diff * competition_factor;

    let weight = weight(old_rating, participant.ratings_count, constants);
    let mut new_rating = (old_rating + weight * performed_as) / (1.0 + weight);

    let cap = constants.cap(participant.ratings_count);
    if old_rating - new_rating > cap {
        new_rating = old_rating - cap;
    }
    if new_rating - old_rating > cap {
        new_rating = old_rating + cap;
    }
    if new_rating < constants.rating_floor {
        new_rating = constants.rating_floor;
    }

    let new_volatility = if participant.ratings_count == 0 {
        constants.first_volatility
    } else {
        let old_volatility = participant.volatility;
        let delta = new_rating - old_rating;
        (old_volatility * old_volatility / (1.0 + weight) + delta * delta / weight).sqrt()
    };

    trace!(
        member_id = participant.member_id,
        performed_as,
        weight,
        new_rating,
        new_volatility,
        "rated"
    );

    let winner = placement.actual_rank == 1.0;

    RatedParticipant {
        prior: participant.clone(),
        expectation,
        placement,
        new_rating: new_rating.round() as i32,
        new_volatility: new_volatility.round() as i32,
        ratings_count: participant.ratings_count + 1,
        winner_count: participant.winner_count + i32::from(winner)
    }
}

/// Effective blending weight of the performance against the prior rating.
/// Shrinks with the number of rated events and for highly rated participants.
fn weight(rating: f64, ratings_count: i32, constants: &RatingConstants) -> f64 {
    let base = (constants.initial_weight - constants.final_weight) / (ratings_count as f64 + 1.0) + constants.final_weight;
    let weight = 1.0 / (1.0 - base) - 1.0;

    if rating >= constants.top_rating {
        weight * constants.top_rating_damping
    } else if rating >= constants.high_rating {
        weight * constants.high_rating_damping
    } else {
        weight
    }
}
