//! The rating engine. Pure functions over an in-memory roster for one event.

use tracing::debug;

use self::{
    competition::competition_factor,
    constants::RatingConstants,
    error::RatingError,
    ranks::{actual_ranks, expected_ranks},
    structures::participant::{EventOutcome, Participant},
    update::update_ratings
};

pub mod competition;
pub mod constants;
pub mod error;
pub mod numeric;
pub mod ranks;
pub mod structures;
pub mod update;

/// Rates one event.
///
/// Stages run in order over the same immutable roster:
/// 1. Competition factor of the field.
/// 2. Expected ranks from prior ratings and volatilities.
/// 3. Actual ranks from final scores, ties sharing their block's mean rank.
/// 4. Rating / volatility update from expected vs. actual performance.
///
/// Either every participant is rated or an error is returned.
pub fn calculate(roster: &[Participant], constants: &RatingConstants) -> Result<EventOutcome, RatingError> {
    constants.validate()?;
    validate(roster)?;

    let average_rating = roster.iter().map(|p| p.rating).sum::<f64>() / roster.len() as f64;
    debug!(average_rating, participants = roster.len(), "average rating");

    let competition_factor = competition_factor(roster)?;
    debug!(competition_factor, "competition factor");

    let expectations = expected_ranks(roster)?;
    let placements = actual_ranks(roster)?;
    let participants = update_ratings(roster, &expectations, &placements, competition_factor, constants);

    Ok(EventOutcome {
        competition_factor,
        average_rating,
        participants
    })
}

fn validate(roster: &[Participant]) -> Result<(), RatingError> {
    if roster.len() < 2 {
        return Err(RatingError::invalid_roster(format!(
            "at least 2 participants are required, found {}",
            roster.len()
        )));
    }

    for p in roster {
        if !(p.volatility.is_finite() && p.volatility > 0.0) {
            return Err(RatingError::invalid_roster(format!(
                "member {} has non-positive volatility {}",
                p.member_id, p.volatility
            )));
        }
        if !p.rating.is_finite() {
            return Err(RatingError::invalid_roster(format!(
                "member {} has non-finite rating {}",
                p.member_id, p.rating
            )));
        }
        if !p.score.is_finite() {
            return Err(RatingError::invalid_roster(format!(
                "member {} has non-finite score {}",
                p.member_id, p.score
            )));
        }
        if p.ratings_count < 0 || p.winner_count < 0 {
            return Err(RatingError::invalid_roster(format!(
                "member {} has negative counters",
                p.member_id
            )));
        }
    }

    Ok(())
}
