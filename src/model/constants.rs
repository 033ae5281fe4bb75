use serde::{Deserialize, Serialize};

use super::{error::RatingError, structures::rating_type::RatingType};

// Marathon match defaults
pub const INITIAL_RATING: f64 = 1200.0;
pub const INITIAL_VOLATILITY: f64 = 515.0;
pub const FIRST_VOLATILITY: f64 = 385.0;
pub const INITIAL_WEIGHT: f64 = 0.6;
pub const FINAL_WEIGHT: f64 = 0.18;
pub const HIGH_RATING: f64 = 2000.0;
pub const HIGH_RATING_DAMPING: f64 = 4.5 / 5.0;
pub const TOP_RATING: f64 = 2500.0;
pub const TOP_RATING_DAMPING: f64 = 4.0 / 5.0;
pub const CAP_BASE: f64 = 150.0;
pub const CAP_SCALE: f64 = 1500.0;
pub const CAP_OFFSET: f64 = 2.0;
pub const RATING_FLOOR: f64 = 1.0;

/// Tuning of the rating law for one rating category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RatingConstants {
    /// Rating seeded for a participant who has never been rated
    pub initial_rating: f64,
    /// Volatility seeded for a participant who has never been rated
    pub initial_volatility: f64,
    /// Volatility assigned after a participant's first rated event
    pub first_volatility: f64,
    /// Blending weight of the first event
    pub initial_weight: f64,
    /// Blending weight approached as the rating count grows
    pub final_weight: f64,
    pub high_rating: f64,
    pub high_rating_damping: f64,
    pub top_rating: f64,
    pub top_rating_damping: f64,
    /// `cap = cap_base + cap_scale / (cap_offset + ratings_count)`
    pub cap_base: f64,
    pub cap_scale: f64,
    pub cap_offset: f64,
    pub rating_floor: f64
}

impl Default for RatingConstants {
    fn default() -> Self {
        RatingConstants {
            initial_rating: INITIAL_RATING,
            initial_volatility: INITIAL_VOLATILITY,
            first_volatility: FIRST_VOLATILITY,
            initial_weight: INITIAL_WEIGHT,
            final_weight: FINAL_WEIGHT,
            high_rating: HIGH_RATING,
            high_rating_damping: HIGH_RATING_DAMPING,
            top_rating: TOP_RATING,
            top_rating_damping: TOP_RATING_DAMPING,
            cap_base: CAP_BASE,
            cap_scale: CAP_SCALE,
            cap_offset: CAP_OFFSET,
            rating_floor: RATING_FLOOR
        }
    }
}

impl RatingConstants {
    pub fn for_rating_type(rating_type: RatingType) -> RatingConstants {
        match rating_type {
            RatingType::Marathon => RatingConstants::default()
        }
    }

    /// The largest distance a new rating may move away from the prior one.
    pub fn cap(&self, ratings_count: i32) -> f64 {
        self.cap_base + self.cap_scale / (self.cap_offset + ratings_count as f64)
    }

    /// Checks that the constants keep the rating law finite and the floor reachable.
    pub fn validate(&self) -> Result<(), RatingError> {
        let fields = [
            ("initialRating", self.initial_rating),
            ("initialVolatility", self.initial_volatility),
            ("firstVolatility", self.first_volatility),
            ("initialWeight", self.initial_weight),
            ("finalWeight", self.final_weight),
            ("highRating", self.high_rating),
            ("highRatingDamping", self.high_rating_damping),
            ("topRating", self.top_rating),
            ("topRatingDamping", self.top_rating_damping),
            ("capBase", self.cap_base),
            ("capScale", self.cap_scale),
            ("capOffset", self.cap_offset),
            ("ratingFloor", self.rating_floor)
        ];
        if let Some((name, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(RatingError::invalid_constants(format!("{} is not finite: {}", name, value)));
        }

        if !(0.0 <= self.final_weight && self.final_weight <= self.initial_weight && self.initial_weight < 1.0) {
            return Err(RatingError::invalid_constants(format!(
                "weights must satisfy 0 <= finalWeight <= initialWeight < 1, found {} and {}",
                self.final_weight, self.initial_weight
            )));
        }
        if self.initial_weight <= 0.0 {
            return Err(RatingError::invalid_constants("initialWeight must be positive"));
        }
        if self.high_rating_damping <= 0.0 || self.top_rating_damping <= 0.0 {
            return Err(RatingError::invalid_constants("damping factors must be positive"));
        }
        if self.cap_offset <= 0.0 || self.cap_base < 0.0 || self.cap_scale < 0.0 {
            return Err(RatingError::invalid_constants(
                "capOffset must be positive and capBase, capScale non-negative"
            ));
        }
        if self.rating_floor < 1.0 {
            return Err(RatingError::invalid_constants(format!(
                "ratingFloor must be at least 1, found {}",
                self.rating_floor
            )));
        }
        if self.initial_volatility <= 0.0 || self.first_volatility <= 0.0 {
            return Err(RatingError::invalid_constants("volatilities must be positive"));
        }

        Ok(())
    }
}
