//! Publicly visible lifecycle phase of a question.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::lifecycle::QuestionPhase;

/// Lifecycle phase exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Votes are accepted.
    Answerable,
    /// Voting closed, results not yet visible.
    LockedPending,
    /// Aggregated results are visible.
    ResultsAvailable,
}

impl From<QuestionPhase> for VisiblePhase {
    fn from(value: QuestionPhase) -> Self {
        match value {
            QuestionPhase::Answerable => VisiblePhase::Answerable,
            QuestionPhase::LockedPending => VisiblePhase::LockedPending,
            QuestionPhase::ResultsAvailable => VisiblePhase::ResultsAvailable,
        }
    }
}
