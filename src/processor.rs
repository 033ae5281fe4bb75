use std::{collections::HashMap, fs, path::Path};

use itertools::Itertools;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    database::{
        db::DbClient,
        db_structs::{RatingHistory, StoredRating}
    },
    error::ProcessorError,
    model::{
        calculate,
        constants::RatingConstants,
        structures::{
            participant::{EventOutcome, Participant},
            rating_type::RatingType
        }
    },
    submissions::{final_scores, FinalScore, Submission}
};

/// Everything produced for one event: the engine's outcome and the rows that
/// persist it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEvent {
    pub event_id: Uuid,
    pub rating_type: RatingType,
    pub outcome: EventOutcome,
    pub ratings: Vec<StoredRating>,
    pub history: Vec<RatingHistory>
}

/// Reads a JSON file overriding any of the default rating constants and
/// rejects overrides the rating law cannot work with.
pub fn load_constants(path: &Path) -> Result<RatingConstants, ProcessorError> {
    let contents = fs::read_to_string(path)?;
    let constants: RatingConstants = serde_json::from_str(&contents)?;
    constants.validate()?;

    info!("Loaded rating constants from {}", path.display());
    Ok(constants)
}

/// Builds the roster of one event from final scores and stored prior ratings.
/// Members without a stored rating are seeded from `constants`.
pub fn build_roster(
    scores: &[FinalScore],
    priors: &HashMap<i32, StoredRating>,
    constants: &RatingConstants
) -> Result<Vec<Participant>, ProcessorError> {
    if let Some(member_id) = scores.iter().map(|s| s.member_id).duplicates().next() {
        return Err(ProcessorError::InvalidInput(format!(
            "member {} has more than one final score",
            member_id
        )));
    }

    let roster = scores
        .iter()
        .map(|s| match priors.get(&s.member_id) {
            Some(prior) => Participant {
                member_id: s.member_id,
                score: s.score,
                rating: prior.rating as f64,
                volatility: prior.volatility as f64,
                ratings_count: prior.ratings_count,
                winner_count: prior.total_wins
            },
            None => Participant {
                member_id: s.member_id,
                score: s.score,
                rating: constants.initial_rating,
                volatility: constants.initial_volatility,
                ratings_count: 0,
                winner_count: 0
            }
        })
        .collect();

    Ok(roster)
}

/// New rating rows for every rated participant.
pub fn rating_updates(outcome: &EventOutcome, event_id: Uuid, rating_type: RatingType) -> Vec<StoredRating> {
    outcome
        .participants
        .iter()
        .map(|p| StoredRating {
            member_id: p.member_id(),
            rating_type,
            challenge_id: Some(event_id),
            win_position: Some(p.placement.position as i32),
            total_wins: p.winner_count,
            rating: p.new_rating,
            volatility: p.new_volatility,
            ratings_count: p.ratings_count
        })
        .collect()
}

/// Pre-update snapshots of every rated participant.
pub fn history_records(
    outcome: &EventOutcome,
    scores: &[FinalScore],
    event_id: Uuid,
    rating_type: RatingType
) -> Result<Vec<RatingHistory>, ProcessorError> {
    let submissions: HashMap<i32, Uuid> = scores.iter().map(|s| (s.member_id, s.submission_id)).collect();

    outcome
        .participants
        .iter()
        .map(|p| {
            let submission_id = submissions.get(&p.member_id()).copied().ok_or_else(|| {
                ProcessorError::InvalidInput(format!("no submission recorded for member {}", p.member_id()))
            })?;

            Ok(RatingHistory {
                member_id: p.member_id(),
                rating_type,
                challenge_id: event_id,
                submission_id,
                score: p.prior.score,
                rank: p.placement.position as i32,
                rating: p.prior.rating.round() as i32,
                volatility: p.prior.volatility.round() as i32,
                ratings_count: p.prior.ratings_count,
                total_wins: p.prior.winner_count
            })
        })
        .collect()
}

/// Rates one event from final scores and prior ratings, without touching storage.
pub fn rate_event(
    event_id: Uuid,
    rating_type: RatingType,
    scores: &[FinalScore],
    priors: &HashMap<i32, StoredRating>,
    constants: &RatingConstants
) -> Result<ProcessedEvent, ProcessorError> {
    let roster = build_roster(scores, priors, constants)?;
    let outcome = calculate(&roster, constants)?;

    let ratings = rating_updates(&outcome, event_id, rating_type);
    let history = history_records(&outcome, scores, event_id, rating_type)?;

    Ok(ProcessedEvent {
        event_id,
        rating_type,
        outcome,
        ratings,
        history
    })
}

/// Runs the whole flow for one event: final scores, prior ratings, rating,
/// and (unless `dry_run`) persistence.
pub async fn process_event(
    db: &mut DbClient,
    event_id: Uuid,
    rating_type: RatingType,
    submissions: &[Submission],
    constants: &RatingConstants,
    dry_run: bool
) -> Result<ProcessedEvent, ProcessorError> {
    info!("=== start: {} rating calculation for event {}", rating_type, event_id);

    if db.is_event_rated(event_id, rating_type).await? {
        return Err(ProcessorError::AlreadyRated { event_id });
    }

    let scores = final_scores(submissions)?;
    info!("{} members have a final score", scores.len());

    let member_ids = scores.iter().map(|s| s.member_id).collect_vec();
    let priors = db.get_ratings(&member_ids, rating_type).await?;

    let processed = rate_event(event_id, rating_type, &scores, &priors, constants)?;

    if dry_run {
        info!("Dry run, skipping persistence");
    } else {
        db.save_event(event_id, rating_type, &processed.ratings, &processed.history)
            .await?;
    }

    info!("=== end: {} rating calculation for event {}", rating_type, event_id);
    Ok(processed)
}
