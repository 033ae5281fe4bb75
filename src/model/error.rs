use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RatingError {
    /// The roster cannot be rated as a whole. Nothing is updated.
    #[error("Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    /// An internal computation produced a rank fraction outside `(0, 1)`.
    #[error("Inverse normal CDF called outside (0, 1): p = {p}")]
    NumericDomain { p: f64 },

    /// The rating constants would break the rating law.
    #[error("Invalid rating constants: {reason}")]
    InvalidConstants { reason: String }
}

impl RatingError {
    pub(crate) fn invalid_roster(reason: impl Into<String>) -> Self {
        RatingError::InvalidRoster { reason: reason.into() }
    }

    pub(crate) fn invalid_constants(reason: impl Into<String>) -> Self {
        RatingError::InvalidConstants { reason: reason.into() }
    }
}
