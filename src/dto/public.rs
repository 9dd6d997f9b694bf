//! DTOs for the public question endpoints.

use serde::Serialize;
use serde_with::skip_serializing_none;
use time::Date;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::QuestionEntity,
    dto::phase::VisiblePhase,
    state::lifecycle::Classification,
};

/// A question together with its lifecycle classification at request time.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionWithStatus {
    /// Stable identifier.
    pub id: Uuid,
    /// Civil publication date.
    pub date: Date,
    /// Prompt shown to voters.
    pub question: String,
    /// Option labels in their canonical order.
    pub choices: Vec<String>,
    /// Optional hero illustration.
    pub image_url: Option<String>,
    /// Derived lifecycle phase.
    pub phase: VisiblePhase,
    /// Whether a vote would be accepted right now.
    pub can_answer: bool,
    /// Whether aggregated results may be shown.
    pub can_view_results: bool,
    /// Whole civil days since publication (negative for future dates).
    pub days_since_publication: i64,
    /// Whole civil days until results unlock (0 once unlocked).
    pub days_until_results: i64,
}

impl From<(QuestionEntity, Classification)> for QuestionWithStatus {
    fn from((question, classification): (QuestionEntity, Classification)) -> Self {
        Self {
            id: question.id,
            date: question.published_at,
            question: question.prompt,
            choices: question.choices,
            image_url: question.image_url,
            phase: classification.phase.into(),
            can_answer: classification.can_answer,
            can_view_results: classification.can_view_results,
            days_since_publication: classification.days_since_publication,
            days_until_results: classification.days_until_results,
        }
    }
}

/// Outcome of merging staged anonymous records into an account.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    /// Records copied into the durable store.
    pub migrated: usize,
    /// Records skipped because the account had already answered.
    pub skipped: usize,
}
