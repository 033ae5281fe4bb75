use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ProcessorError;

/// Aggregate scores at or below this value mark a member who never
/// submitted a final solution.
pub const NO_FINAL_SCORE: f64 = -1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub member_id: i32,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub review_summation: Option<Vec<ReviewSummation>>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummation {
    pub aggregate_score: f64,
    pub created: DateTime<Utc>
}

/// The one score a member is rated on for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScore {
    pub member_id: i32,
    pub submission_id: Uuid,
    pub score: f64
}

/// Reads a JSON array of submissions exported for one event.
pub fn read_submissions(path: &Path) -> Result<Vec<Submission>, ProcessorError> {
    let contents = fs::read_to_string(path)?;
    let submissions: Vec<Submission> = serde_json::from_str(&contents)?;

    info!("Read {} submissions from {}", submissions.len(), path.display());
    Ok(submissions)
}

/// Reduces every member's submissions to a single final score.
///
/// A member is scored on their most recent submission, using that submission's
/// most recent review summation. Members whose latest submission is unreviewed,
/// or whose latest aggregate score is at or below [`NO_FINAL_SCORE`], are left
/// out. The result is ordered by score, lowest first.
pub fn final_scores(submissions: &[Submission]) -> Result<Vec<FinalScore>, ProcessorError> {
    let mut by_member: IndexMap<i32, Vec<&Submission>> = IndexMap::new();
    for submission in submissions {
        by_member.entry(submission.member_id).or_default().push(submission);
    }

    let mut scores = Vec::with_capacity(by_member.len());

    for (member_id, member_submissions) in by_member {
        let Some(latest) = member_submissions.into_iter().max_by_key(|s| s.created) else {
            continue;
        };

        let review = latest
            .review_summation
            .as_deref()
            .and_then(|reviews| reviews.iter().max_by_key(|r| r.created));

        let Some(review) = review else {
            warn!("Member {} has no reviewed final submission, skipping", member_id);
            continue;
        };

        if !review.aggregate_score.is_finite() {
            return Err(ProcessorError::InvalidInput(format!(
                "member {} has a non-numeric score",
                member_id
            )));
        }

        if review.aggregate_score <= NO_FINAL_SCORE {
            warn!("Member {} did not submit a final solution, skipping", member_id);
            continue;
        }

        scores.push(FinalScore {
            member_id,
            submission_id: latest.id,
            score: review.aggregate_score
        });
    }

    scores.sort_by(|a, b| a.score.total_cmp(&b.score));

    Ok(scores)
}
