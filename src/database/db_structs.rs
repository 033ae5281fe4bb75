use crate::model::structures::rating_type::RatingType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current rating of a member in one rating category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRating {
    pub member_id: i32,
    pub rating_type: RatingType,
    /// The last event this rating was updated by
    pub challenge_id: Option<Uuid>,
    /// Placement in the last event
    pub win_position: Option<i32>,
    pub total_wins: i32,
    pub rating: i32,
    pub volatility: i32,
    pub ratings_count: i32
}

/// Snapshot of a member's rating taken before an event updated it.
/// Keyed by member, rating type and event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingHistory {
    pub member_id: i32,
    pub rating_type: RatingType,
    pub challenge_id: Uuid,
    pub submission_id: Uuid,
    /// Score in this event
    pub score: f64,
    /// Placement in this event
    pub rank: i32,
    pub rating: i32,
    pub volatility: i32,
    pub ratings_count: i32,
    pub total_wins: i32
}
