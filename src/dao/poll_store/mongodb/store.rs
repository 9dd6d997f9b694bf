//! MongoDB implementation of the [`PollStore`] trait.

use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use time::Date;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoQuestionDocument, MongoStatsDocument, MongoVoteDocument, doc_id, encode_date,
        uuid_as_binary,
    },
};
use crate::dao::{
    models::{Correctness, QuestionEntity, UserStatsEntity, VoteRecordEntity},
    poll_store::PollStore,
    storage::StorageResult,
};

const QUESTION_COLLECTION_NAME: &str = "questions";
const VOTE_COLLECTION_NAME: &str = "votes";
const STATS_COLLECTION_NAME: &str = "user_stats";

/// Durable poll store backed by MongoDB collections.
#[derive(Clone)]
pub struct MongoPollStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoPollStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        // One question per civil date, enforced at the storage level.
        let questions = database.collection::<MongoQuestionDocument>(QUESTION_COLLECTION_NAME);
        let date_index = IndexModel::builder()
            .keys(doc! {"published_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("question_date_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        questions
            .create_index(date_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: QUESTION_COLLECTION_NAME,
                index: "published_at",
                source,
            })?;

        // Lookup index for the per-voter duplicate check. Deliberately not
        // unique: at-most-once is a check-then-insert in the service layer.
        let votes = database.collection::<MongoVoteDocument>(VOTE_COLLECTION_NAME);
        let vote_index = IndexModel::builder()
            .keys(doc! {"question_id": 1, "voter.kind": 1, "voter.id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("vote_voter_idx".to_owned()))
                    .build(),
            )
            .build();
        votes
            .create_index(vote_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: VOTE_COLLECTION_NAME,
                index: "question_id,voter",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn question_collection(&self) -> Collection<MongoQuestionDocument> {
        self.database()
            .await
            .collection::<MongoQuestionDocument>(QUESTION_COLLECTION_NAME)
    }

    async fn vote_collection(&self) -> Collection<MongoVoteDocument> {
        self.database()
            .await
            .collection::<MongoVoteDocument>(VOTE_COLLECTION_NAME)
    }

    async fn stats_collection(&self) -> Collection<MongoStatsDocument> {
        self.database()
            .await
            .collection::<MongoStatsDocument>(STATS_COLLECTION_NAME)
    }

    async fn save_question(&self, question: QuestionEntity) -> MongoResult<()> {
        let id = question.id;
        let document: MongoQuestionDocument = question.into();
        self.question_collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveQuestion { id, source })?;
        Ok(())
    }

    async fn find_question(&self, id: Uuid) -> MongoResult<Option<QuestionEntity>> {
        let document = self
            .question_collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn find_question_by_date(&self, date: Date) -> MongoResult<Option<QuestionEntity>> {
        let document = self
            .question_collection()
            .await
            .find_one(doc! {"published_at": encode_date(date)})
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn list_questions(&self) -> MongoResult<Vec<QuestionEntity>> {
        let documents: Vec<MongoQuestionDocument> = self
            .question_collection()
            .await
            .find(doc! {})
            .sort(doc! {"published_at": -1})
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_questions_before(
        &self,
        date: Date,
        limit: usize,
    ) -> MongoResult<Vec<QuestionEntity>> {
        // Stored dates are `YYYY-MM-DD` strings, so lexicographic `$lt` and
        // descending sort match chronological order.
        let documents: Vec<MongoQuestionDocument> = self
            .question_collection()
            .await
            .find(doc! {"published_at": doc! {"$lt": encode_date(date)}})
            .sort(doc! {"published_at": -1})
            .limit(limit as i64)
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadQuestions { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_question(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .question_collection()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteQuestion { id, source })?;
        Ok(result.deleted_count > 0)
    }

    fn vote_filter(question_id: Uuid, user_id: Uuid) -> mongodb::bson::Document {
        doc! {
            "question_id": uuid_as_binary(question_id),
            "voter.kind": "user",
            "voter.id": uuid_as_binary(user_id),
        }
    }

    async fn find_vote(
        &self,
        question_id: Uuid,
        user_id: Uuid,
    ) -> MongoResult<Option<VoteRecordEntity>> {
        let document = self
            .vote_collection()
            .await
            .find_one(Self::vote_filter(question_id, user_id))
            .await
            .map_err(|source| MongoDaoError::LoadVotes { question_id, source })?;

        Ok(document.map(Into::into))
    }

    async fn insert_vote(&self, record: VoteRecordEntity) -> MongoResult<()> {
        let question_id = record.question_id;
        let document: MongoVoteDocument = record.into();
        self.vote_collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveVote {
                question_id,
                source,
            })?;
        Ok(())
    }

    async fn list_votes(&self, question_id: Uuid) -> MongoResult<Vec<VoteRecordEntity>> {
        let documents: Vec<MongoVoteDocument> = self
            .vote_collection()
            .await
            .find(doc! {"question_id": uuid_as_binary(question_id)})
            .await
            .map_err(|source| MongoDaoError::LoadVotes { question_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadVotes { question_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn set_vote_correctness(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        correctness: Correctness,
    ) -> MongoResult<()> {
        self.vote_collection()
            .await
            .update_one(
                Self::vote_filter(question_id, user_id),
                doc! {"$set": {"correct": correctness.as_flag()}},
            )
            .await
            .map_err(|source| MongoDaoError::SaveVote {
                question_id,
                source,
            })?;
        Ok(())
    }

    async fn delete_votes_for_question(&self, question_id: Uuid) -> MongoResult<u64> {
        let result = self
            .vote_collection()
            .await
            .delete_many(doc! {"question_id": uuid_as_binary(question_id)})
            .await
            .map_err(|source| MongoDaoError::SaveVote {
                question_id,
                source,
            })?;
        Ok(result.deleted_count)
    }

    async fn find_stats(&self, user_id: Uuid) -> MongoResult<Option<UserStatsEntity>> {
        let document = self
            .stats_collection()
            .await
            .find_one(doc_id(user_id))
            .await
            .map_err(|source| MongoDaoError::LoadStats { user_id, source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn save_stats(&self, stats: UserStatsEntity) -> MongoResult<()> {
        let user_id = stats.user_id;
        let document: MongoStatsDocument = stats.into();
        self.stats_collection()
            .await
            .replace_one(doc_id(user_id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveStats { user_id, source })?;
        Ok(())
    }
}

impl PollStore for MongoPollStore {
    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_question(question).await.map_err(Into::into) })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question(id).await.map_err(Into::into) })
    }

    fn find_question_by_date(
        &self,
        date: Date,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question_by_date(date).await.map_err(Into::into) })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_questions().await.map_err(Into::into) })
    }

    fn list_questions_before(
        &self,
        date: Date,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_questions_before(date, limit)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_question(id).await.map_err(Into::into) })
    }

    fn find_vote(
        &self,
        question_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<VoteRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_vote(question_id, user_id).await.map_err(Into::into) })
    }

    fn insert_vote(&self, record: VoteRecordEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_vote(record).await.map_err(Into::into) })
    }

    fn list_votes(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_votes(question_id).await.map_err(Into::into) })
    }

    fn set_vote_correctness(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        correctness: Correctness,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .set_vote_correctness(question_id, user_id, correctness)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_votes_for_question(
        &self,
        question_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_votes_for_question(question_id)
                .await
                .map_err(Into::into)
        })
    }

    fn find_stats(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<UserStatsEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_stats(user_id).await.map_err(Into::into) })
    }

    fn save_stats(&self, stats: UserStatsEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_stats(stats).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
