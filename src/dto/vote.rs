//! DTOs for vote submission.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Payload submitted when a voter answers the daily question.
///
/// The answer and the majority guess are captured in the same submission;
/// there is no partial vote.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VoteRequest {
    /// Question being answered.
    pub question_id: Uuid,
    /// Option the voter picked for themselves.
    #[validate(length(min = 1, message = "answer must not be empty"))]
    pub answer: String,
    /// Option the voter predicts will win the majority.
    #[validate(length(min = 1, message = "majority guess must not be empty"))]
    pub majority_guess: String,
}

/// Acknowledgement returned for an accepted vote.
#[derive(Debug, Serialize, ToSchema)]
pub struct VoteResponse {
    /// Always true for accepted votes; rejections use the error body.
    pub success: bool,
}
