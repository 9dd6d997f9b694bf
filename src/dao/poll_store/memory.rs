//! In-memory [`PollStore`] used by service-level tests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use futures::future::BoxFuture;
use time::Date;
use uuid::Uuid;

use crate::dao::models::{Correctness, QuestionEntity, UserStatsEntity, VoteRecordEntity};
use crate::dao::poll_store::PollStore;
use crate::dao::storage::{StorageError, StorageResult};

/// Hash-map backed store mirroring the durable backends' observable
/// behaviour, including a switch that makes writes fail to exercise the
/// staging fallback.
#[derive(Default)]
pub struct MemoryPollStore {
    questions: DashMap<Uuid, QuestionEntity>,
    votes: DashMap<(Uuid, Uuid), VoteRecordEntity>,
    stats: DashMap<Uuid, UserStatsEntity>,
    fail_writes: AtomicBool,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent write operations fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn write_guard(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "memory store writes disabled".into(),
                io::Error::new(io::ErrorKind::ConnectionRefused, "simulated outage"),
            ));
        }
        Ok(())
    }
}

impl PollStore for MemoryPollStore {
    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let guard = self.write_guard();
        if guard.is_ok() {
            self.questions.insert(question.id, question);
        }
        Box::pin(async move { guard })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let found = self.questions.get(&id).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn find_question_by_date(
        &self,
        date: Date,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let found = self
            .questions
            .iter()
            .find(|entry| entry.published_at == date)
            .map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let mut all: Vec<QuestionEntity> =
            self.questions.iter().map(|entry| entry.clone()).collect();
        all.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Box::pin(async move { Ok(all) })
    }

    fn list_questions_before(
        &self,
        date: Date,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let mut past: Vec<QuestionEntity> = self
            .questions
            .iter()
            .filter(|entry| entry.published_at < date)
            .map(|entry| entry.clone())
            .collect();
        past.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        past.truncate(limit);
        Box::pin(async move { Ok(past) })
    }

    fn delete_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let guard = self.write_guard();
        let removed = guard.is_ok() && self.questions.remove(&id).is_some();
        Box::pin(async move { guard.map(|()| removed) })
    }

    fn find_vote(
        &self,
        question_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<VoteRecordEntity>>> {
        let found = self
            .votes
            .get(&(question_id, user_id))
            .map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn insert_vote(&self, record: VoteRecordEntity) -> BoxFuture<'static, StorageResult<()>> {
        let guard = self.write_guard().and_then(|()| {
            let user_id = record.voter.user_id().ok_or_else(|| {
                StorageError::unavailable(
                    "anonymous record reached the durable store".into(),
                    io::Error::new(io::ErrorKind::InvalidInput, "anonymous voter"),
                )
            })?;
            self.votes.insert((record.question_id, user_id), record);
            Ok(())
        });
        Box::pin(async move { guard })
    }

    fn list_votes(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteRecordEntity>>> {
        let all: Vec<VoteRecordEntity> = self
            .votes
            .iter()
            .filter(|entry| entry.key().0 == question_id)
            .map(|entry| entry.clone())
            .collect();
        Box::pin(async move { Ok(all) })
    }

    fn set_vote_correctness(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        correctness: Correctness,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let guard = self.write_guard();
        if guard.is_ok() {
            if let Some(mut entry) = self.votes.get_mut(&(question_id, user_id)) {
                entry.correctness = correctness;
            }
        }
        Box::pin(async move { guard })
    }

    fn delete_votes_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let guard = self.write_guard();
        let mut removed = 0;
        if guard.is_ok() {
            self.votes.retain(|key, _| {
                if key.0 == question_id {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        Box::pin(async move { guard.map(|()| removed) })
    }

    fn find_stats(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<UserStatsEntity>>> {
        let found = self.stats.get(&user_id).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_stats(&self, stats: UserStatsEntity) -> BoxFuture<'static, StorageResult<()>> {
        let guard = self.write_guard();
        if guard.is_ok() {
            self.stats.insert(stats.user_id, stats);
        }
        Box::pin(async move { guard })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}
