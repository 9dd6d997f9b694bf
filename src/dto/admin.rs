//! DTO definitions used by the admin REST API.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::Date;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{public::QuestionWithStatus, validation::validate_choices};

/// Payload describing a question to create or the new shape of an edited one.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct QuestionPayload {
    /// Civil date the question is (or will be) published on.
    pub date: Date,
    /// Prompt shown to voters.
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub question: String,
    /// Option labels: 2 to 4, distinct, non-empty.
    #[validate(custom(function = validate_choices))]
    pub choices: Vec<String>,
    /// Optional hero illustration URL.
    pub image_url: Option<String>,
}

/// Response returned when a question has been created.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateQuestionResponse {
    /// Always true; failures use the error body.
    pub success: bool,
    /// Identifier assigned to the new question.
    pub id: Uuid,
}

/// Generic acknowledgement for admin mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Always true; failures use the error body.
    pub success: bool,
}

/// Question projection for the admin listing, including both unlock horizons
/// and relative-date flags.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminQuestionView {
    /// Question fields plus lifecycle classification.
    #[serde(flatten)]
    pub question: QuestionWithStatus,
    /// Unlock date written by the sync path (publish + configured delay).
    pub results_unlock_date: Date,
    /// Published exactly today.
    pub is_today: bool,
    /// Scheduled for a future date.
    pub is_future: bool,
    /// Published before today.
    pub is_past: bool,
}
