//! Business logic powering the admin REST routes: question CRUD with the
//! one-question-per-date invariant and the vote-record cascade on delete.

use time::{Date, Duration};
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::QuestionEntity,
    dto::admin::{AdminQuestionView, CreateQuestionResponse, QuestionPayload},
    error::ServiceError,
    state::{SharedState, lifecycle::classify},
};

/// All questions, newest first, with classification and relative-date flags.
pub async fn list_questions(state: &SharedState) -> Result<Vec<AdminQuestionView>, ServiceError> {
    let store = state.require_poll_store().await?;
    let today = state.today();

    let questions = store.list_questions().await?;
    Ok(questions
        .into_iter()
        .map(|question| {
            let classification = classify(question.published_at, today);
            let date = question.published_at;
            let results_unlock_date = question.results_unlock_date;
            AdminQuestionView {
                question: (question, classification).into(),
                results_unlock_date,
                is_today: date == today,
                is_future: date > today,
                is_past: date < today,
            }
        })
        .collect())
}

/// Create a question on a free date.
pub async fn create_question(
    state: &SharedState,
    payload: QuestionPayload,
) -> Result<CreateQuestionResponse, ServiceError> {
    let store = state.require_poll_store().await?;

    if store.find_question_by_date(payload.date).await?.is_some() {
        return Err(ServiceError::InvalidInput(
            "a question already exists for this date".into(),
        ));
    }

    let id = Uuid::new_v4();
    let question = QuestionEntity {
        id,
        published_at: payload.date,
        prompt: payload.question,
        choices: payload.choices,
        image_url: payload.image_url,
        results_unlock_date: sync_unlock_date(state, payload.date)?,
    };
    store.save_question(question).await?;

    info!(question_id = %id, date = %payload.date, "created question");
    Ok(CreateQuestionResponse { success: true, id })
}

/// Replace the date, text, and choices of an existing question. The identity
/// is immutable; existing vote records keep pointing at it.
pub async fn update_question(
    state: &SharedState,
    id: Uuid,
    payload: QuestionPayload,
) -> Result<(), ServiceError> {
    let store = state.require_poll_store().await?;

    if store.find_question(id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("question `{id}` not found")));
    }

    if let Some(other) = store.find_question_by_date(payload.date).await?
        && other.id != id
    {
        return Err(ServiceError::InvalidInput(
            "another question already exists for this date".into(),
        ));
    }

    let question = QuestionEntity {
        id,
        published_at: payload.date,
        prompt: payload.question,
        choices: payload.choices,
        image_url: payload.image_url,
        results_unlock_date: sync_unlock_date(state, payload.date)?,
    };
    store.save_question(question).await?;

    info!(question_id = %id, "updated question");
    Ok(())
}

/// Delete a question and cascade to every vote record, durable and staged.
pub async fn delete_question(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_poll_store().await?;

    let existed = store.delete_question(id).await?;
    if !existed {
        return Err(ServiceError::NotFound(format!("question `{id}` not found")));
    }

    let removed = store.delete_votes_for_question(id).await?;
    state.anon_stage().remove_question(id);

    info!(question_id = %id, votes_removed = removed, "deleted question");
    Ok(())
}

/// Unlock date written alongside a question for the sync path: publish date
/// plus the configured delay (three days, distinct from the one-day gate).
fn sync_unlock_date(state: &SharedState, published_at: Date) -> Result<Date, ServiceError> {
    published_at
        .checked_add(Duration::days(state.config().results_sync_delay_days))
        .ok_or_else(|| ServiceError::InvalidInput("publish date out of range".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::{
            models::{CallerIdentity, Correctness, VoteRecordEntity, VoterIdentity},
            poll_store::{PollStore, memory::MemoryPollStore},
        },
        state::{AppState, SharedState},
    };

    async fn state_with_store() -> (SharedState, Arc<MemoryPollStore>) {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(MemoryPollStore::new());
        state.set_poll_store(store.clone()).await;
        (state, store)
    }

    fn payload(state: &SharedState, days_ago: i64) -> QuestionPayload {
        QuestionPayload {
            date: state.today() - Duration::days(days_ago),
            question: "Pizza or burgers?".into(),
            choices: vec!["Pizza".into(), "Burgers".into()],
            image_url: None,
        }
    }

    #[tokio::test]
    async fn created_question_carries_the_sync_unlock_date() {
        let (state, store) = state_with_store().await;

        let created = create_question(&state, payload(&state, 0)).await.unwrap();

        let question = store.find_question(created.id).await.unwrap().unwrap();
        assert_eq!(
            question.results_unlock_date,
            question.published_at + Duration::days(3)
        );
    }

    #[tokio::test]
    async fn second_question_on_the_same_date_is_rejected() {
        let (state, _store) = state_with_store().await;

        create_question(&state, payload(&state, 0)).await.unwrap();
        let second = create_question(&state, payload(&state, 0)).await;

        assert!(matches!(second, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn update_rejects_a_date_held_by_another_question() {
        let (state, _store) = state_with_store().await;

        create_question(&state, payload(&state, 1)).await.unwrap();
        let second = create_question(&state, payload(&state, 0)).await.unwrap();

        let moved = update_question(&state, second.id, payload(&state, 1)).await;
        assert!(matches!(moved, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn updating_the_same_question_keeps_its_date() {
        let (state, store) = state_with_store().await;

        let created = create_question(&state, payload(&state, 0)).await.unwrap();
        let mut edited = payload(&state, 0);
        edited.question = "Pizza or salad?".into();
        edited.choices = vec!["Pizza".into(), "Salad".into()];

        update_question(&state, created.id, edited).await.unwrap();

        let question = store.find_question(created.id).await.unwrap().unwrap();
        assert_eq!(question.prompt, "Pizza or salad?");
        assert_eq!(question.choices, vec!["Pizza".to_owned(), "Salad".to_owned()]);
    }

    #[tokio::test]
    async fn delete_cascades_to_durable_and_staged_votes() {
        let (state, store) = state_with_store().await;
        let created = create_question(&state, payload(&state, 0)).await.unwrap();
        let user = Uuid::new_v4();

        store
            .insert_vote(VoteRecordEntity {
                question_id: created.id,
                voter: VoterIdentity::User(user),
                answer: "Pizza".into(),
                prediction: "Pizza".into(),
                correctness: Correctness::Unknown,
            })
            .await
            .unwrap();
        state.anon_stage().insert(
            "browser",
            VoteRecordEntity {
                question_id: created.id,
                voter: VoterIdentity::Anonymous("browser".into()),
                answer: "Burgers".into(),
                prediction: "Pizza".into(),
                correctness: Correctness::Unknown,
            },
        );

        delete_question(&state, created.id).await.unwrap();

        assert!(store.find_question(created.id).await.unwrap().is_none());
        assert!(store.list_votes(created.id).await.unwrap().is_empty());
        assert!(state.anon_stage().votes_for_question(created.id).is_empty());
    }

    #[tokio::test]
    async fn deleting_an_unknown_question_is_not_found() {
        let (state, _store) = state_with_store().await;
        let outcome = delete_question(&state, Uuid::new_v4()).await;
        assert!(matches!(outcome, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn admin_listing_flags_relative_dates() {
        let (state, _store) = state_with_store().await;
        create_question(&state, payload(&state, 1)).await.unwrap();
        create_question(&state, payload(&state, 0)).await.unwrap();
        create_question(&state, payload(&state, -1)).await.unwrap();

        let listing = list_questions(&state).await.unwrap();

        assert_eq!(listing.len(), 3);
        // Newest first.
        assert!(listing[0].is_future);
        assert!(listing[1].is_today);
        assert!(listing[2].is_past);
        assert!(!listing[2].question.can_answer);
        assert!(listing[1].question.can_answer);
    }

    #[tokio::test]
    async fn end_to_end_anonymous_vote_then_login_then_reconcile_once() {
        // Anonymous vote, login claim, then a results read resolves the
        // prediction and credits statistics exactly once.
        let (state, store) = state_with_store().await;
        let created = create_question(&state, payload(&state, 0)).await.unwrap();
        let question = store.find_question(created.id).await.unwrap().unwrap();

        let caller = CallerIdentity {
            user: None,
            anon_id: Some("browser".into()),
        };
        crate::services::vote_service::submit_vote(
            &state,
            &caller,
            crate::dto::vote::VoteRequest {
                question_id: question.id,
                answer: "Pizza".into(),
                majority_guess: "Pizza".into(),
            },
        )
        .await
        .unwrap();

        let user = Uuid::new_v4();
        let report = crate::services::migration_service::claim_records(&state, "browser", user)
            .await
            .unwrap();
        assert_eq!(report.migrated, 1);

        // Move the question into the unlocked phase by re-dating it.
        let mut aged = question.clone();
        aged.published_at = state.today() - Duration::days(1);
        store.save_question(aged).await.unwrap();

        let logged_in = CallerIdentity {
            user: Some(user),
            anon_id: Some("browser".into()),
        };
        let first = crate::services::results_service::question_results(
            &state,
            question.id,
            &logged_in,
        )
        .await
        .unwrap();
        assert!(!first.locked);
        assert_eq!(first.total_votes, Some(1));

        let stats_after_first = store.find_stats(user).await.unwrap().unwrap();
        crate::services::results_service::question_results(&state, question.id, &logged_in)
            .await
            .unwrap();
        let stats_after_second = store.find_stats(user).await.unwrap().unwrap();

        assert_eq!(stats_after_first, stats_after_second);
        assert_eq!(stats_after_second.wins, 1);
    }
}
