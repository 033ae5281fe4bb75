use serde::{Deserialize, Serialize};

/// One contestant's prior state and final score for a single event.
/// Prior fields are already seeded with defaults for first-timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub member_id: i32,
    /// Higher is better. Compared with exact equality for ties.
    pub score: f64,
    pub rating: f64,
    pub volatility: f64,
    pub ratings_count: i32,
    pub winner_count: i32
}

/// Where a participant is expected to finish given everyone's prior ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectation {
    /// `0.5 + sum of win probabilities of every participant (self included) against this one`
    pub expected_rank: f64,
    pub expected_performance: f64
}

/// Where a participant actually finished.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Mean rank of the participant's tie block
    pub actual_rank: f64,
    pub actual_performance: f64,
    /// 1-based position of the first member of the tie block
    pub position: u32
}

/// A participant after the rating update, carrying every intermediate value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedParticipant {
    /// State before this event
    pub prior: Participant,
    pub expectation: Expectation,
    pub placement: Placement,
    pub new_rating: i32,
    pub new_volatility: i32,
    pub ratings_count: i32,
    pub winner_count: i32
}

impl RatedParticipant {
    pub fn member_id(&self) -> i32 {
        self.prior.member_id
    }

    /// True when the participant finished first without sharing the spot.
    pub fn is_winner(&self) -> bool {
        self.placement.actual_rank == 1.0
    }
}

/// Result of rating one event. Persisting it is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutcome {
    pub competition_factor: f64,
    pub average_rating: f64,
    pub participants: Vec<RatedParticipant>
}

impl EventOutcome {
    pub fn get(&self, member_id: i32) -> Option<&RatedParticipant> {
        self.participants.iter().find(|p| p.member_id() == member_id)
    }

    pub fn winners(&self) -> impl Iterator<Item = &RatedParticipant> {
        self.participants.iter().filter(|p| p.is_winner())
    }
}
