//! Vote submission: lifecycle gating, duplicate detection, and routing
//! between the durable store and the anonymous staging area.

use tracing::{debug, warn};

use crate::{
    dao::models::{CallerIdentity, Correctness, QuestionEntity, VoteRecordEntity, VoterIdentity},
    dto::vote::VoteRequest,
    error::ServiceError,
    state::{SharedState, lifecycle::classify},
};

/// Accept or reject a vote for the calling identity.
///
/// The lifecycle gate is re-derived server-side at the moment of submission;
/// client-held state is never trusted. The duplicate check is a plain
/// check-then-insert: two near-simultaneous submissions from the same
/// identity can both land. The impact is limited to a duplicate statistics
/// credit, so the race is documented rather than locked away.
pub async fn submit_vote(
    state: &SharedState,
    caller: &CallerIdentity,
    request: VoteRequest,
) -> Result<(), ServiceError> {
    let voter = caller
        .voter()
        .ok_or_else(|| ServiceError::Unauthorized("no voter identity presented".into()))?;

    let store = state.require_poll_store().await?;
    let question = store
        .find_question(request.question_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("question `{}` not found", request.question_id))
        })?;

    let classification = classify(question.published_at, state.today());
    if !classification.can_answer {
        return Err(ServiceError::Locked);
    }

    validate_option(&question, &request.answer)?;
    validate_option(&question, &request.majority_guess)?;

    let record = VoteRecordEntity {
        question_id: question.id,
        voter: voter.clone(),
        answer: request.answer,
        prediction: request.majority_guess,
        correctness: Correctness::Unknown,
    };

    match &voter {
        VoterIdentity::Anonymous(anon_id) => {
            if state.anon_stage().find(anon_id, question.id).is_some() {
                return Err(ServiceError::AlreadyAnswered);
            }
            state.anon_stage().insert(anon_id, record);
            debug!(question_id = %question.id, "staged anonymous vote");
            Ok(())
        }
        VoterIdentity::User(user_id) => {
            // A pending copy staged during an earlier outage also counts as
            // an existing answer.
            if let Some(anon_id) = &caller.anon_id
                && state.anon_stage().find(anon_id, question.id).is_some()
            {
                return Err(ServiceError::AlreadyAnswered);
            }
            if store.find_vote(question.id, *user_id).await?.is_some() {
                return Err(ServiceError::AlreadyAnswered);
            }

            match store.insert_vote(record.clone()).await {
                Ok(()) => {
                    debug!(question_id = %question.id, user_id = %user_id, "recorded vote");
                    Ok(())
                }
                Err(err) => {
                    // Durable write failed: stage the record under the
                    // browser identity so the next claim merges it.
                    let Some(anon_id) = &caller.anon_id else {
                        return Err(err.into());
                    };
                    warn!(
                        question_id = %question.id,
                        user_id = %user_id,
                        error = %err,
                        "durable vote write failed; staging under browser identity"
                    );
                    state.anon_stage().insert(anon_id, record);
                    Ok(())
                }
            }
        }
    }
}

fn validate_option(question: &QuestionEntity, value: &str) -> Result<(), ServiceError> {
    if question.choices.iter().any(|choice| choice == value) {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "`{value}` is not one of this question's choices"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::Duration;
    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        dao::poll_store::{PollStore, memory::MemoryPollStore},
        state::{AppState, SharedState},
    };

    async fn state_with_store() -> (SharedState, Arc<MemoryPollStore>) {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(MemoryPollStore::new());
        state.set_poll_store(store.clone()).await;
        (state, store)
    }

    fn question_published(state: &SharedState, days_ago: i64) -> QuestionEntity {
        let published_at = state.today() - Duration::days(days_ago);
        QuestionEntity {
            id: Uuid::new_v4(),
            published_at,
            prompt: "Coffee or tea?".into(),
            choices: vec!["Coffee".into(), "Tea".into()],
            image_url: None,
            results_unlock_date: published_at + Duration::days(3),
        }
    }

    fn vote_for(question: &QuestionEntity) -> VoteRequest {
        VoteRequest {
            question_id: question.id,
            answer: "Coffee".into(),
            majority_guess: "Tea".into(),
        }
    }

    fn anon_caller(id: &str) -> CallerIdentity {
        CallerIdentity {
            user: None,
            anon_id: Some(id.into()),
        }
    }

    fn user_caller(user: Uuid) -> CallerIdentity {
        CallerIdentity {
            user: Some(user),
            anon_id: Some("browser".into()),
        }
    }

    #[tokio::test]
    async fn second_vote_from_same_anonymous_identity_is_rejected() {
        let (state, store) = state_with_store().await;
        let question = question_published(&state, 0);
        store.save_question(question.clone()).await.unwrap();

        let caller = anon_caller("browser-a");
        submit_vote(&state, &caller, vote_for(&question))
            .await
            .unwrap();
        let second = submit_vote(&state, &caller, vote_for(&question)).await;

        assert!(matches!(second, Err(ServiceError::AlreadyAnswered)));
        assert_eq!(state.anon_stage().votes_for_question(question.id).len(), 1);
    }

    #[tokio::test]
    async fn second_vote_from_same_user_is_rejected() {
        let (state, store) = state_with_store().await;
        let question = question_published(&state, 0);
        store.save_question(question.clone()).await.unwrap();

        let caller = user_caller(Uuid::new_v4());
        submit_vote(&state, &caller, vote_for(&question))
            .await
            .unwrap();
        let second = submit_vote(&state, &caller, vote_for(&question)).await;

        assert!(matches!(second, Err(ServiceError::AlreadyAnswered)));
    }

    #[tokio::test]
    async fn day_old_question_is_locked() {
        let (state, store) = state_with_store().await;
        let question = question_published(&state, 1);
        store.save_question(question.clone()).await.unwrap();

        let outcome = submit_vote(&state, &anon_caller("a"), vote_for(&question)).await;

        assert!(matches!(outcome, Err(ServiceError::Locked)));
    }

    #[tokio::test]
    async fn future_dated_question_accepts_votes() {
        let (state, store) = state_with_store().await;
        let question = question_published(&state, -1);
        store.save_question(question.clone()).await.unwrap();

        submit_vote(&state, &anon_caller("a"), vote_for(&question))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_option_is_rejected() {
        let (state, store) = state_with_store().await;
        let question = question_published(&state, 0);
        store.save_question(question.clone()).await.unwrap();

        let request = VoteRequest {
            question_id: question.id,
            answer: "Cocoa".into(),
            majority_guess: "Tea".into(),
        };
        let outcome = submit_vote(&state, &anon_caller("a"), request).await;

        assert!(matches!(outcome, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn authenticated_vote_is_staged_when_durable_write_fails() {
        let (state, store) = state_with_store().await;
        let question = question_published(&state, 0);
        store.save_question(question.clone()).await.unwrap();

        let user = Uuid::new_v4();
        store.fail_writes(true);
        submit_vote(&state, &user_caller(user), vote_for(&question))
            .await
            .unwrap();
        store.fail_writes(false);

        assert!(store.find_vote(question.id, user).await.unwrap().is_none());
        let staged = state.anon_stage().find("browser", question.id).unwrap();
        assert_eq!(staged.voter, VoterIdentity::User(user));
    }

    #[tokio::test]
    async fn staged_fallback_copy_blocks_a_resubmission() {
        let (state, store) = state_with_store().await;
        let question = question_published(&state, 0);
        store.save_question(question.clone()).await.unwrap();

        let caller = user_caller(Uuid::new_v4());
        store.fail_writes(true);
        submit_vote(&state, &caller, vote_for(&question))
            .await
            .unwrap();
        store.fail_writes(false);

        let second = submit_vote(&state, &caller, vote_for(&question)).await;
        assert!(matches!(second, Err(ServiceError::AlreadyAnswered)));
    }
}
