//! DTOs for the results endpoint.

use serde::Serialize;
use serde_with::skip_serializing_none;
use time::Date;
use utoipa::ToSchema;

use crate::{dao::models::QuestionEntity, state::lifecycle::Classification};

/// Percentage of votes one option received.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ChoiceResult {
    /// Option label, in the question's declared order.
    pub choice: String,
    /// Independently rounded share of the total. Percentages are not
    /// normalized, so their sum may drift slightly from 100.
    pub percentage: u32,
}

/// Results payload: either still locked with the remaining wait, or the
/// aggregated percentages.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultsResponse {
    /// Prompt of the question.
    pub question: String,
    /// Civil publication date.
    pub date: Date,
    /// Whether results are still locked.
    pub locked: bool,
    /// Days until results unlock; present only while locked.
    pub days_until_results: Option<i64>,
    /// Human readable unlock notice; present only while locked.
    pub message: Option<String>,
    /// Per-option percentages in declared order; present once unlocked.
    pub results: Option<Vec<ChoiceResult>>,
    /// Total number of vote records tallied; present once unlocked.
    pub total_votes: Option<u64>,
}

impl ResultsResponse {
    /// Locked payload carrying the remaining wait.
    pub fn locked(question: &QuestionEntity, classification: &Classification) -> Self {
        let days = classification.days_until_results;
        let plural = if days == 1 { "" } else { "s" };
        Self {
            question: question.prompt.clone(),
            date: question.published_at,
            locked: true,
            days_until_results: Some(days),
            message: Some(format!("Results will unlock in {days} day{plural}")),
            results: None,
            total_votes: None,
        }
    }

    /// Unlocked payload carrying the aggregated percentages.
    pub fn available(
        question: &QuestionEntity,
        results: Vec<ChoiceResult>,
        total_votes: u64,
    ) -> Self {
        Self {
            question: question.prompt.clone(),
            date: question.published_at,
            locked: false,
            days_until_results: None,
            message: None,
            results: Some(results),
            total_votes: Some(total_votes),
        }
    }
}
