use thiserror::Error;
use uuid::Uuid;

use crate::model::error::RatingError;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event {event_id} has already been rated")]
    AlreadyRated { event_id: Uuid },

    #[error("Event {event_id} has not been rated")]
    NotRated { event_id: Uuid },

    #[error("Cannot roll back: member {member_id} has been rated in a later event")]
    RollbackConflict { member_id: i32 }
}
