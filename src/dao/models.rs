//! Entity definitions shared across storage backends and services.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

/// Daily question persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Stable identifier for the question.
    pub id: Uuid,
    /// Civil publication date; unique across all questions.
    pub published_at: Date,
    /// Prompt shown to voters.
    pub prompt: String,
    /// Ordered option labels (2 to 4, distinct). The order is canonical and
    /// drives result presentation and tie-breaking.
    pub choices: Vec<String>,
    /// Optional hero illustration shown with the prompt.
    pub image_url: Option<String>,
    /// Unlock date written by the admin sync path (publish + 3 days). The
    /// lifecycle engine gates on the one-day voting window instead; both
    /// horizons are kept side by side.
    pub results_unlock_date: Date,
}

/// Identity a vote record is keyed under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum VoterIdentity {
    /// Browser-scoped pseudo-identity held in a long-lived cookie.
    Anonymous(String),
    /// Stable identifier issued by the external authentication layer.
    User(Uuid),
}

impl VoterIdentity {
    /// The authenticated user id, when this identity is one.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            VoterIdentity::User(id) => Some(*id),
            VoterIdentity::Anonymous(_) => None,
        }
    }
}

/// Identities presented by a single request: an authenticated user id, a
/// browser pseudo-identity, or both (a logged-in browser usually still
/// carries its anonymous cookie).
#[derive(Debug, Clone, Default)]
pub struct CallerIdentity {
    /// User id established by the external auth layer, if any.
    pub user: Option<Uuid>,
    /// Pseudo-identity from the `anon_id` cookie, if present.
    pub anon_id: Option<String>,
}

impl CallerIdentity {
    /// Resolve the identity votes should be recorded under. The
    /// authenticated identity wins when both are present.
    pub fn voter(&self) -> Option<VoterIdentity> {
        if let Some(user) = self.user {
            return Some(VoterIdentity::User(user));
        }
        self.anon_id.clone().map(VoterIdentity::Anonymous)
    }
}

/// Tri-state outcome of a majority prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    /// Results have not unlocked, or the record has not been reconciled yet.
    Unknown,
    /// The predicted option matched the majority answer.
    Correct,
    /// The predicted option did not match the majority answer.
    Incorrect,
}

impl Correctness {
    /// Whether reconciliation has already resolved this record.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Correctness::Unknown)
    }

    /// Map to the nullable boolean column used by table stores.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Correctness::Unknown => None,
            Correctness::Correct => Some(true),
            Correctness::Incorrect => Some(false),
        }
    }

    /// Build from the nullable boolean column used by table stores.
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Correctness::Unknown,
            Some(true) => Correctness::Correct,
            Some(false) => Correctness::Incorrect,
        }
    }
}

/// A voter's answer and majority prediction for one question.
///
/// At most one record exists per (question, voter) pair, enforced by a
/// check-then-insert in the service layer rather than a storage constraint.
/// The correctness field is written exactly once, when reconciliation runs
/// after results unlock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteRecordEntity {
    /// Question this vote belongs to.
    pub question_id: Uuid,
    /// Identity the record is keyed under.
    pub voter: VoterIdentity,
    /// Option the voter picked for themselves.
    pub answer: String,
    /// Option the voter predicted would win the majority.
    pub prediction: String,
    /// Outcome of the prediction, resolved lazily after results unlock.
    pub correctness: Correctness,
}

/// Cumulative prediction statistics for one authenticated user.
///
/// Created lazily on first reconciliation and mutated only by it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserStatsEntity {
    /// Owner of these statistics.
    pub user_id: Uuid,
    /// Total points earned from correct predictions.
    pub points: u32,
    /// Number of correct predictions.
    pub wins: u32,
    /// Number of incorrect predictions.
    pub losses: u32,
    /// Stored redundantly as wins / (wins + losses) * 100.
    pub accuracy: f32,
    /// Consecutive correct predictions, reset on a miss.
    pub current_win_streak: u32,
    /// Highest win streak ever reached.
    pub best_win_streak: u32,
    /// Consecutive civil days with at least one resolved prediction.
    pub daily_streak: u32,
    /// Highest daily streak ever reached.
    pub best_daily_streak: u32,
    /// Civil date of the most recent resolved prediction.
    pub last_answered_date: Option<Date>,
}

impl UserStatsEntity {
    /// Fresh zeroed statistics for a user with no resolved predictions.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            points: 0,
            wins: 0,
            losses: 0,
            accuracy: 0.0,
            current_win_streak: 0,
            best_win_streak: 0,
            daily_streak: 0,
            best_daily_streak: 0,
            last_answered_date: None,
        }
    }
}
