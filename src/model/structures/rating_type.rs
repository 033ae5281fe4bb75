use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Rating category. Ratings, counters and history are namespaced by it.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, AsRefStr,
)]
pub enum RatingType {
    #[serde(rename = "MM")]
    #[strum(serialize = "MM")]
    Marathon
}

impl RatingType {
    /// Identifier persisted in the `rating_type_id` columns.
    pub fn id(&self) -> &'static str {
        match self {
            RatingType::Marathon => "MM"
        }
    }
}
