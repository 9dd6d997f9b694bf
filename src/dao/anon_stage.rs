//! In-process staging area for votes tied to a browser pseudo-identity.
//!
//! Anonymous voters never reach the durable store; their records live here,
//! keyed by the `anon_id` cookie value, until the browser authenticates and
//! the migration pass merges them into the durable backend. Entries expire on
//! the same horizon as the cookie itself.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use uuid::Uuid;

use crate::dao::models::VoteRecordEntity;

#[derive(Debug, Clone)]
struct StagedVote {
    record: VoteRecordEntity,
    staged_at: SystemTime,
}

/// Staged vote records keyed by (pseudo-identity, question id).
pub struct AnonVoteStage {
    records: DashMap<(String, Uuid), StagedVote>,
    retention: Duration,
}

impl AnonVoteStage {
    /// Create a stage whose entries expire after `retention_days`.
    pub fn new(retention_days: u64) -> Self {
        Self {
            records: DashMap::new(),
            retention: Duration::from_secs(retention_days * 24 * 60 * 60),
        }
    }

    /// Look up the staged record for one pseudo-identity and question.
    pub fn find(&self, anon_id: &str, question_id: Uuid) -> Option<VoteRecordEntity> {
        self.prune_expired();
        self.records
            .get(&(anon_id.to_owned(), question_id))
            .map(|entry| entry.record.clone())
    }

    /// Stage a record under the given pseudo-identity, replacing any previous
    /// entry for the same question. The at-most-once check happens in the
    /// service layer before this call, mirroring the durable path.
    pub fn insert(&self, anon_id: &str, record: VoteRecordEntity) {
        self.records.insert(
            (anon_id.to_owned(), record.question_id),
            StagedVote {
                record,
                staged_at: SystemTime::now(),
            },
        );
    }

    /// All staged records for one question, across every pseudo-identity.
    pub fn votes_for_question(&self, question_id: Uuid) -> Vec<VoteRecordEntity> {
        self.prune_expired();
        self.records
            .iter()
            .filter(|entry| entry.key().1 == question_id)
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// All staged records held for one pseudo-identity.
    pub fn records_for_identity(&self, anon_id: &str) -> Vec<VoteRecordEntity> {
        self.prune_expired();
        self.records
            .iter()
            .filter(|entry| entry.key().0 == anon_id)
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Drop one staged record after it has been merged durably.
    pub fn remove(&self, anon_id: &str, question_id: Uuid) {
        self.records.remove(&(anon_id.to_owned(), question_id));
    }

    /// Drop every staged record for a question (question-deletion cascade).
    pub fn remove_question(&self, question_id: Uuid) {
        self.records.retain(|key, _| key.1 != question_id);
    }

    fn prune_expired(&self) {
        let now = SystemTime::now();
        self.records.retain(|_, staged| {
            now.duration_since(staged.staged_at)
                .map(|age| age < self.retention)
                .unwrap_or(true)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{Correctness, VoterIdentity};

    fn record(question_id: Uuid, anon_id: &str) -> VoteRecordEntity {
        VoteRecordEntity {
            question_id,
            voter: VoterIdentity::Anonymous(anon_id.to_owned()),
            answer: "Coffee".into(),
            prediction: "Tea".into(),
            correctness: Correctness::Unknown,
        }
    }

    #[test]
    fn staged_record_is_found_under_its_identity() {
        let stage = AnonVoteStage::new(365);
        let question = Uuid::new_v4();
        stage.insert("browser-a", record(question, "browser-a"));

        assert!(stage.find("browser-a", question).is_some());
        assert!(stage.find("browser-b", question).is_none());
        assert!(stage.find("browser-a", Uuid::new_v4()).is_none());
    }

    #[test]
    fn question_tally_spans_identities() {
        let stage = AnonVoteStage::new(365);
        let question = Uuid::new_v4();
        stage.insert("a", record(question, "a"));
        stage.insert("b", record(question, "b"));
        stage.insert("c", record(Uuid::new_v4(), "c"));

        assert_eq!(stage.votes_for_question(question).len(), 2);
    }

    #[test]
    fn remove_question_cascades_across_identities() {
        let stage = AnonVoteStage::new(365);
        let question = Uuid::new_v4();
        stage.insert("a", record(question, "a"));
        stage.insert("b", record(question, "b"));

        stage.remove_question(question);

        assert!(stage.votes_for_question(question).is_empty());
        assert!(stage.records_for_identity("a").is_empty());
    }

    #[test]
    fn expired_entries_are_pruned_on_read() {
        let stage = AnonVoteStage::new(0);
        let question = Uuid::new_v4();
        stage.insert("a", record(question, "a"));

        assert!(stage.find("a", question).is_none());
    }

    #[test]
    fn removing_one_record_keeps_the_rest() {
        let stage = AnonVoteStage::new(365);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        stage.insert("a", record(first, "a"));
        stage.insert("a", record(second, "a"));

        stage.remove("a", first);

        assert!(stage.find("a", first).is_none());
        assert!(stage.find("a", second).is_some());
    }
}
