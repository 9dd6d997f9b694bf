//! [`PollStore`] implementation talking to a PostgREST-style table API.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, header};
use serde::de::DeserializeOwned;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
    models::{ANSWERS_TABLE, AnswerRow, QUESTIONS_TABLE, QuestionRow, STATS_TABLE, StatsRow},
};
use crate::dao::{
    models::{Correctness, QuestionEntity, UserStatsEntity, VoteRecordEntity},
    poll_store::PollStore,
    storage::StorageResult,
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

fn query_date(date: Date) -> String {
    date.format(&DATE_FORMAT)
        .unwrap_or_else(|_| "invalid-date".into())
}

/// Durable poll store backed by a remote table API (e.g. a Supabase project).
#[derive(Clone)]
pub struct RestPollStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl RestPollStore {
    /// Build the HTTP client and probe the questions table once.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: config.api_key.map(Arc::<str>::from),
        };

        store.probe().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &str, query: &str) -> (String, reqwest::RequestBuilder) {
        let path = if query.is_empty() {
            format!("rest/v1/{table}")
        } else {
            format!("rest/v1/{table}?{query}")
        };
        let url = format!("{}/{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(ref key) = self.api_key {
            builder = builder
                .header("apikey", key.as_ref())
                .header(header::AUTHORIZATION, format!("Bearer {key}"));
        }
        (path, builder)
    }

    async fn fetch_rows<T>(&self, table: &str, query: &str) -> RestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let (path, builder) = self.request(Method::GET, table, query);
        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(RestDaoError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse { path, source })
    }

    async fn fetch_first<T>(&self, table: &str, query: &str) -> RestResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut rows = self.fetch_rows::<T>(table, query).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    async fn send_write<B>(
        &self,
        method: Method,
        table: &str,
        query: &str,
        body: &B,
        upsert: bool,
    ) -> RestResult<()>
    where
        B: serde::Serialize,
    {
        let (path, mut builder) = self.request(method, table, query);
        builder = builder.json(body);
        builder = if upsert {
            builder.header("Prefer", "resolution=merge-duplicates,return=minimal")
        } else {
            builder.header("Prefer", "return=minimal")
        };

        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RestDaoError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        Ok(())
    }

    /// Delete matching rows and report how many were removed.
    async fn delete_counted(&self, table: &str, query: &str) -> RestResult<u64> {
        let (path, builder) = self.request(Method::DELETE, table, query);
        let response = builder
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RestDaoError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|source| RestDaoError::DecodeResponse { path, source })?;
        Ok(rows.len() as u64)
    }

    async fn probe(&self) -> RestResult<()> {
        self.fetch_rows::<serde_json::Value>(QUESTIONS_TABLE, "select=id&limit=1")
            .await
            .map(|_| ())
    }

    async fn save_question(&self, question: QuestionEntity) -> RestResult<()> {
        let row: QuestionRow = question.into();
        self.send_write(Method::POST, QUESTIONS_TABLE, "on_conflict=id", &row, true)
            .await
    }

    async fn find_question(&self, id: Uuid) -> RestResult<Option<QuestionEntity>> {
        let row = self
            .fetch_first::<QuestionRow>(QUESTIONS_TABLE, &format!("select=*&id=eq.{id}&limit=1"))
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_question_by_date(&self, date: Date) -> RestResult<Option<QuestionEntity>> {
        let query = format!("select=*&published_at=eq.{}&limit=1", query_date(date));
        let row = self.fetch_first::<QuestionRow>(QUESTIONS_TABLE, &query).await?;
        Ok(row.map(Into::into))
    }

    async fn list_questions(&self) -> RestResult<Vec<QuestionEntity>> {
        let rows = self
            .fetch_rows::<QuestionRow>(QUESTIONS_TABLE, "select=*&order=published_at.desc")
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_questions_before(
        &self,
        date: Date,
        limit: usize,
    ) -> RestResult<Vec<QuestionEntity>> {
        let query = format!(
            "select=*&published_at=lt.{}&order=published_at.desc&limit={limit}",
            query_date(date)
        );
        let rows = self.fetch_rows::<QuestionRow>(QUESTIONS_TABLE, &query).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_question(&self, id: Uuid) -> RestResult<bool> {
        let removed = self
            .delete_counted(QUESTIONS_TABLE, &format!("id=eq.{id}"))
            .await?;
        Ok(removed > 0)
    }

    async fn find_vote(
        &self,
        question_id: Uuid,
        user_id: Uuid,
    ) -> RestResult<Option<VoteRecordEntity>> {
        let query = format!("select=*&question_id=eq.{question_id}&user_id=eq.{user_id}&limit=1");
        let row = self.fetch_first::<AnswerRow>(ANSWERS_TABLE, &query).await?;
        Ok(row.map(Into::into))
    }

    async fn insert_vote(&self, record: VoteRecordEntity) -> RestResult<()> {
        let row: AnswerRow = record.try_into()?;
        self.send_write(Method::POST, ANSWERS_TABLE, "", &row, false)
            .await
    }

    async fn list_votes(&self, question_id: Uuid) -> RestResult<Vec<VoteRecordEntity>> {
        let query = format!("select=*&question_id=eq.{question_id}");
        let rows = self.fetch_rows::<AnswerRow>(ANSWERS_TABLE, &query).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_vote_correctness(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        correctness: Correctness,
    ) -> RestResult<()> {
        let query = format!("question_id=eq.{question_id}&user_id=eq.{user_id}");
        let body = serde_json::json!({ "correct": correctness.as_flag() });
        self.send_write(Method::PATCH, ANSWERS_TABLE, &query, &body, false)
            .await
    }

    async fn delete_votes_for_question(&self, question_id: Uuid) -> RestResult<u64> {
        self.delete_counted(ANSWERS_TABLE, &format!("question_id=eq.{question_id}"))
            .await
    }

    async fn find_stats(&self, user_id: Uuid) -> RestResult<Option<UserStatsEntity>> {
        let query = format!("select=*&user_id=eq.{user_id}&limit=1");
        let row = self.fetch_first::<StatsRow>(STATS_TABLE, &query).await?;
        Ok(row.map(Into::into))
    }

    async fn save_stats(&self, stats: UserStatsEntity) -> RestResult<()> {
        let row: StatsRow = stats.into();
        self.send_write(Method::POST, STATS_TABLE, "on_conflict=user_id", &row, true)
            .await
    }
}

impl PollStore for RestPollStore {
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
        Box::pin(async move { store.probe().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // The HTTP client is stateless, so reconnecting amounts to probing
        // the endpoint again.
        let store = self.clone();
        Box::pin(async move { store.probe().await.map_err(Into::into) })
    }
}
