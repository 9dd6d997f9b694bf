//! Read-only projections of questions and statistics for public clients.

use uuid::Uuid;

use crate::{
    dao::models::UserStatsEntity,
    dto::{public::QuestionWithStatus, stats::StatsResponse},
    error::ServiceError,
    state::{SharedState, lifecycle::classify},
};

/// Return today's question with its lifecycle classification.
pub async fn today_question(state: &SharedState) -> Result<QuestionWithStatus, ServiceError> {
    let store = state.require_poll_store().await?;
    let today = state.today();

    let question = store
        .find_question_by_date(today)
        .await?
        .ok_or_else(|| ServiceError::NotFound("no question for today".into()))?;

    let classification = classify(question.published_at, today);
    Ok((question, classification).into())
}

/// Return one question by id with its lifecycle classification.
pub async fn question_by_id(
    state: &SharedState,
    id: Uuid,
) -> Result<QuestionWithStatus, ServiceError> {
    let store = state.require_poll_store().await?;

    let question = store
        .find_question(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("question `{id}` not found")))?;

    let classification = classify(question.published_at, state.today());
    Ok((question, classification).into())
}

/// Return the most recent questions published strictly before today.
pub async fn past_questions(state: &SharedState) -> Result<Vec<QuestionWithStatus>, ServiceError> {
    let store = state.require_poll_store().await?;
    let today = state.today();
    let limit = state.config().past_questions_limit;

    let questions = store.list_questions_before(today, limit).await?;
    Ok(questions
        .into_iter()
        .map(|question| {
            let classification = classify(question.published_at, today);
            (question, classification).into()
        })
        .collect())
}

/// Return the caller's cumulative statistics, zeroed when none exist yet.
pub async fn user_stats(state: &SharedState, user_id: Uuid) -> Result<StatsResponse, ServiceError> {
    let store = state.require_poll_store().await?;
    let stats = store
        .find_stats(user_id)
        .await?
        .unwrap_or_else(|| UserStatsEntity::new(user_id));
    Ok(stats.into())
}
