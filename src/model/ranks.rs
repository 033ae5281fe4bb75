use itertools::Itertools;
use tracing::trace;

use super::{
    error::RatingError,
    numeric::{performance, win_probability},
    structures::participant::{Expectation, Participant, Placement}
};

/// Expected rank and performance of every participant, in roster order.
///
/// The sum runs over the whole roster including the participant itself, whose
/// self-comparison contributes exactly 0.5.
pub fn expected_ranks(roster: &[Participant]) -> Result<Vec<Expectation>, RatingError> {
    let n = roster.len() as f64;

    roster
        .iter()
        .map(|x| {
            let expected_rank = 0.5
                + roster
                    .iter()
                    .map(|y| win_probability(y.rating, x.rating, y.volatility, x.volatility))
                    .sum::<f64>();
            let expected_performance = performance((expected_rank - 0.5) / n)?;

            trace!(
                member_id = x.member_id,
                expected_rank,
                expected_performance,
                "expected rank"
            );

            Ok(Expectation {
                expected_rank,
                expected_performance
            })
        })
        .collect()
}

/// Actual rank and performance of every participant, in roster order.
///
/// Participants are walked from the highest score down. Every run of exactly
/// equal scores forms one tie block sharing the block's mean rank.
pub fn actual_ranks(roster: &[Participant]) -> Result<Vec<Placement>, RatingError> {
    let n = roster.len() as f64;

    // Stable, so members of a tie block keep their roster order.
    let order = (0..roster.len())
        .sorted_by(|&a, &b| roster[b].score.total_cmp(&roster[a].score))
        .collect_vec();

    let mut placements: Vec<Option<Placement>> = vec![None; roster.len()];
    let mut position = 0usize;

    for (_, block) in &order.iter().chunk_by(|&&i| roster[i].score) {
        let block = block.copied().collect_vec();
        let count = block.len() as f64;
        let placement = Placement {
            actual_rank: position as f64 + 0.5 + count / 2.0,
            actual_performance: performance((position as f64 + count / 2.0) / n)?,
            position: position as u32 + 1
        };

        for i in block.iter().copied() {
            placements[i] = Some(placement);
        }

        position += block.len();
    }

    placements
        .into_iter()
        .map(|p| p.ok_or_else(|| RatingError::invalid_roster("participant left unranked")))
        .collect()
}
