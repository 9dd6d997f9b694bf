//! Resolution of pending majority predictions and statistics upkeep.
//!
//! Reconciliation is triggered lazily when a client reads unlocked results
//! with a pending prediction. There is no queue: idempotency rests on the
//! tri-state correctness field. Concurrent reads by the same user can still
//! race the read-modify-write on statistics; with the expected traffic that
//! window is accepted and documented rather than locked away.

use time::{Date, Duration};
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{Correctness, QuestionEntity, UserStatsEntity},
    dto::results::ChoiceResult,
    error::ServiceError,
    state::SharedState,
};

/// The majority answer: the first option in declared order holding the
/// highest percentage. Ties resolve deterministically to the earliest
/// declared option.
pub fn majority_choice(results: &[ChoiceResult]) -> Option<&str> {
    let top = results.iter().map(|result| result.percentage).max()?;
    results
        .iter()
        .find(|result| result.percentage == top)
        .map(|result| result.choice.as_str())
}

/// Fold one resolved prediction into a user's cumulative statistics.
pub fn apply_outcome(
    stats: &mut UserStatsEntity,
    was_correct: bool,
    today: Date,
    points_per_win: u32,
) {
    if was_correct {
        stats.wins += 1;
        stats.points += points_per_win;
        stats.current_win_streak += 1;
    } else {
        stats.losses += 1;
        stats.current_win_streak = 0;
    }

    let resolved = stats.wins + stats.losses;
    stats.accuracy = if resolved == 0 {
        0.0
    } else {
        stats.wins as f32 / resolved as f32 * 100.0
    };

    stats.daily_streak = match stats.last_answered_date {
        Some(last) if last == today => stats.daily_streak,
        Some(last) if today - last == Duration::days(1) => stats.daily_streak + 1,
        _ => 1,
    };

    stats.best_win_streak = stats.best_win_streak.max(stats.current_win_streak);
    stats.best_daily_streak = stats.best_daily_streak.max(stats.daily_streak);
    stats.last_answered_date = Some(today);
}

/// Resolve the calling user's pending prediction for one question, if any.
///
/// A record that is already resolved is left untouched, so repeated calls
/// are no-ops and statistics are credited exactly once per prediction.
pub async fn reconcile_pending(
    state: &SharedState,
    question: &QuestionEntity,
    results: &[ChoiceResult],
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let store = state.require_poll_store().await?;

    let Some(vote) = store.find_vote(question.id, user_id).await? else {
        return Ok(());
    };
    if vote.correctness.is_resolved() {
        return Ok(());
    }
    let Some(majority) = majority_choice(results) else {
        return Ok(());
    };

    let was_correct = vote.prediction == majority;
    let correctness = if was_correct {
        Correctness::Correct
    } else {
        Correctness::Incorrect
    };
    store
        .set_vote_correctness(question.id, user_id, correctness)
        .await?;

    let mut stats = store
        .find_stats(user_id)
        .await?
        .unwrap_or_else(|| UserStatsEntity::new(user_id));
    apply_outcome(
        &mut stats,
        was_correct,
        state.today(),
        state.config().points_per_win,
    );
    store.save_stats(stats).await?;

    info!(
        question_id = %question.id,
        user_id = %user_id,
        was_correct,
        "reconciled pending prediction"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::macros::date;

    use crate::{
        config::AppConfig,
        dao::{
            models::{VoteRecordEntity, VoterIdentity},
            poll_store::{PollStore, memory::MemoryPollStore},
        },
        state::{AppState, SharedState},
    };

    fn result(choice: &str, percentage: u32) -> ChoiceResult {
        ChoiceResult {
            choice: choice.into(),
            percentage,
        }
    }

    #[test]
    fn majority_is_the_highest_percentage() {
        let results = vec![result("A", 20), result("B", 60), result("C", 20)];
        assert_eq!(majority_choice(&results), Some("B"));
    }

    #[test]
    fn ties_resolve_to_the_first_declared_option() {
        let results = vec![result("A", 50), result("B", 50)];
        for _ in 0..10 {
            assert_eq!(majority_choice(&results), Some("A"));
        }
    }

    #[test]
    fn empty_results_have_no_majority() {
        assert_eq!(majority_choice(&[]), None);
    }

    #[test]
    fn correct_outcome_updates_counters_and_points() {
        let mut stats = UserStatsEntity::new(Uuid::new_v4());
        apply_outcome(&mut stats, true, date!(2026 - 03 - 10), 10);

        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 0);
        assert_eq!(stats.points, 10);
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.current_win_streak, 1);
        assert_eq!(stats.best_win_streak, 1);
        assert_eq!(stats.daily_streak, 1);
        assert_eq!(stats.last_answered_date, Some(date!(2026 - 03 - 10)));
    }

    #[test]
    fn incorrect_outcome_resets_the_win_streak_but_not_its_best() {
        let mut stats = UserStatsEntity::new(Uuid::new_v4());
        apply_outcome(&mut stats, true, date!(2026 - 03 - 10), 10);
        apply_outcome(&mut stats, true, date!(2026 - 03 - 11), 10);
        apply_outcome(&mut stats, false, date!(2026 - 03 - 12), 10);

        assert_eq!(stats.current_win_streak, 0);
        assert_eq!(stats.best_win_streak, 2);
        assert_eq!(stats.points, 20);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert!((stats.accuracy - 66.666_664).abs() < 0.001);
    }

    #[test]
    fn daily_streak_increments_on_consecutive_days_only() {
        let mut stats = UserStatsEntity::new(Uuid::new_v4());
        apply_outcome(&mut stats, true, date!(2026 - 03 - 10), 10);
        assert_eq!(stats.daily_streak, 1);

        // Next day extends the streak.
        apply_outcome(&mut stats, false, date!(2026 - 03 - 11), 10);
        assert_eq!(stats.daily_streak, 2);

        // Same day leaves it unchanged.
        apply_outcome(&mut stats, true, date!(2026 - 03 - 11), 10);
        assert_eq!(stats.daily_streak, 2);

        // A gap resets it to one.
        apply_outcome(&mut stats, true, date!(2026 - 03 - 15), 10);
        assert_eq!(stats.daily_streak, 1);
        assert_eq!(stats.best_daily_streak, 2);
    }

    async fn state_with_store() -> (SharedState, Arc<MemoryPollStore>) {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(MemoryPollStore::new());
        state.set_poll_store(store.clone()).await;
        (state, store)
    }

    fn sample_question(state: &SharedState) -> QuestionEntity {
        let published_at = state.today() - Duration::days(1);
        QuestionEntity {
            id: Uuid::new_v4(),
            published_at,
            prompt: "Coffee or tea?".into(),
            choices: vec!["Coffee".into(), "Tea".into()],
            image_url: None,
            results_unlock_date: published_at + Duration::days(3),
        }
    }

    #[tokio::test]
    async fn reconciling_twice_credits_statistics_once() {
        let (state, store) = state_with_store().await;
        let question = sample_question(&state);
        let user = Uuid::new_v4();

        store
            .insert_vote(VoteRecordEntity {
                question_id: question.id,
                voter: VoterIdentity::User(user),
                answer: "Coffee".into(),
                prediction: "Coffee".into(),
                correctness: Correctness::Unknown,
            })
            .await
            .unwrap();

        let results = vec![result("Coffee", 100), result("Tea", 0)];
        reconcile_pending(&state, &question, &results, user)
            .await
            .unwrap();
        let first = store.find_stats(user).await.unwrap().unwrap();

        reconcile_pending(&state, &question, &results, user)
            .await
            .unwrap();
        let second = store.find_stats(user).await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.wins, 1);
        assert_eq!(second.points, 10);
        let vote = store.find_vote(question.id, user).await.unwrap().unwrap();
        assert_eq!(vote.correctness, Correctness::Correct);
    }

    #[tokio::test]
    async fn wrong_prediction_counts_as_a_loss() {
        let (state, store) = state_with_store().await;
        let question = sample_question(&state);
        let user = Uuid::new_v4();

        store
            .insert_vote(VoteRecordEntity {
                question_id: question.id,
                voter: VoterIdentity::User(user),
                answer: "Coffee".into(),
                prediction: "Tea".into(),
                correctness: Correctness::Unknown,
            })
            .await
            .unwrap();

        let results = vec![result("Coffee", 100), result("Tea", 0)];
        reconcile_pending(&state, &question, &results, user)
            .await
            .unwrap();

        let stats = store.find_stats(user).await.unwrap().unwrap();
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.points, 0);
        let vote = store.find_vote(question.id, user).await.unwrap().unwrap();
        assert_eq!(vote.correctness, Correctness::Incorrect);
    }

    #[tokio::test]
    async fn user_without_a_record_is_a_no_op() {
        let (state, store) = state_with_store().await;
        let question = sample_question(&state);
        let user = Uuid::new_v4();

        let results = vec![result("Coffee", 100)];
        reconcile_pending(&state, &question, &results, user)
            .await
            .unwrap();

        assert!(store.find_stats(user).await.unwrap().is_none());
    }
}
