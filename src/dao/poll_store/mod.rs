//! Durable persistence abstraction for questions, votes, and statistics.

#[cfg(test)]
pub(crate) mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;
#[cfg(feature = "rest-store")]
pub mod rest;

use futures::future::BoxFuture;
use time::Date;
use uuid::Uuid;

use crate::dao::models::{Correctness, QuestionEntity, UserStatsEntity, VoteRecordEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the durable store holding the question table,
/// authenticated vote records, and user statistics.
///
/// Vote records reach a durable backend only once they carry an
/// authenticated identity; anonymous records live in the staging area until
/// the migration pass promotes them. Uniqueness of (question, voter) is a
/// service-layer check-then-insert, so implementations must not add their own
/// uniqueness constraint on vote records.
pub trait PollStore: Send + Sync {
    /// Insert or replace a question.
    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a question by id.
    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Fetch the question published on the given civil date.
    fn find_question_by_date(
        &self,
        date: Date,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// All questions, newest publication first.
    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Questions published strictly before `date`, newest first, capped at `limit`.
    fn list_questions_before(
        &self,
        date: Date,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Delete a question; returns whether it existed. Vote records are
    /// removed through [`PollStore::delete_votes_for_question`].
    fn delete_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Fetch the vote record one user holds for one question.
    fn find_vote(
        &self,
        question_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<VoteRecordEntity>>>;
    /// Append a vote record carrying an authenticated identity.
    fn insert_vote(&self, record: VoteRecordEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// All vote records for a question.
    fn list_votes(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteRecordEntity>>>;
    /// Resolve the correctness flag on an existing record.
    fn set_vote_correctness(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        correctness: Correctness,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove every vote record for a question, returning the removed count.
    fn delete_votes_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<u64>>;

    /// Fetch a user's cumulative statistics.
    fn find_stats(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<UserStatsEntity>>>;
    /// Insert or replace a user's cumulative statistics.
    fn save_stats(&self, stats: UserStatsEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Cheap liveness probe against the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
