//! Vote aggregation once a question's results unlock.

use indexmap::IndexMap;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::{CallerIdentity, VoteRecordEntity},
    dto::results::{ChoiceResult, ResultsResponse},
    error::ServiceError,
    services::reconcile_service,
    state::{SharedState, lifecycle::classify},
};

/// Compute the results payload for one question.
///
/// While the question is locked this returns the remaining wait instead of an
/// error, so clients can render the countdown. Once unlocked, the tally spans
/// both the durable store and the anonymous staging area, and any pending
/// prediction of the calling authenticated identity is reconciled lazily.
pub async fn question_results(
    state: &SharedState,
    question_id: Uuid,
    caller: &CallerIdentity,
) -> Result<ResultsResponse, ServiceError> {
    let store = state.require_poll_store().await?;
    let question = store
        .find_question(question_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("question `{question_id}` not found")))?;

    let classification = classify(question.published_at, state.today());
    if !classification.can_view_results {
        return Ok(ResultsResponse::locked(&question, &classification));
    }

    let mut records = store.list_votes(question_id).await?;
    records.extend(state.anon_stage().votes_for_question(question_id));
    let (results, total_votes) = tally_votes(&question.choices, &records);

    if let Some(user_id) = caller.user {
        // Reconciliation failures must not hide the results from the reader;
        // the next read retries because the record stays unresolved.
        if let Err(err) =
            reconcile_service::reconcile_pending(state, &question, &results, user_id).await
        {
            warn!(
                question_id = %question_id,
                user_id = %user_id,
                error = %err,
                "lazy reconciliation failed"
            );
        }
    }

    Ok(ResultsResponse::available(&question, results, total_votes))
}

/// Tally records into per-option percentages, preserving declared order.
///
/// Each percentage is rounded independently; the sum may drift from 100 and
/// is intentionally not re-normalized. Records whose answer no longer matches
/// a declared choice (the question was edited) still count toward the total.
pub fn tally_votes(choices: &[String], records: &[VoteRecordEntity]) -> (Vec<ChoiceResult>, u64) {
    let mut counts: IndexMap<&str, u64> = choices
        .iter()
        .map(|choice| (choice.as_str(), 0u64))
        .collect();

    for record in records {
        if let Some(count) = counts.get_mut(record.answer.as_str()) {
            *count += 1;
        }
    }

    let total = records.len() as u64;
    let results = counts
        .into_iter()
        .map(|(choice, count)| ChoiceResult {
            choice: choice.to_owned(),
            percentage: if total == 0 {
                0
            } else {
                ((count as f64 / total as f64) * 100.0).round() as u32
            },
        })
        .collect();

    (results, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{Correctness, VoterIdentity};

    fn record(answer: &str) -> VoteRecordEntity {
        VoteRecordEntity {
            question_id: Uuid::new_v4(),
            voter: VoterIdentity::Anonymous(Uuid::new_v4().to_string()),
            answer: answer.into(),
            prediction: answer.into(),
            correctness: Correctness::Unknown,
        }
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn two_one_zero_split_rounds_to_67_33_0() {
        let choices = labels(&["A", "B", "C"]);
        let records = vec![record("A"), record("A"), record("B")];

        let (results, total) = tally_votes(&choices, &records);

        assert_eq!(total, 3);
        assert_eq!(results[0], ChoiceResult { choice: "A".into(), percentage: 67 });
        assert_eq!(results[1], ChoiceResult { choice: "B".into(), percentage: 33 });
        assert_eq!(results[2], ChoiceResult { choice: "C".into(), percentage: 0 });
    }

    #[test]
    fn no_votes_yields_zero_percentages() {
        let (results, total) = tally_votes(&labels(&["A", "B"]), &[]);

        assert_eq!(total, 0);
        assert!(results.iter().all(|result| result.percentage == 0));
    }

    #[test]
    fn declared_order_is_preserved_regardless_of_counts() {
        let choices = labels(&["First", "Second", "Third"]);
        let records = vec![record("Third"), record("Third"), record("Second")];

        let (results, _) = tally_votes(&choices, &records);

        let order: Vec<&str> = results.iter().map(|result| result.choice.as_str()).collect();
        assert_eq!(order, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn stale_answers_still_count_toward_the_total() {
        // The question was edited after this voter answered.
        let choices = labels(&["A", "B"]);
        let records = vec![record("A"), record("Removed")];

        let (results, total) = tally_votes(&choices, &records);

        assert_eq!(total, 2);
        assert_eq!(results[0].percentage, 50);
        assert_eq!(results[1].percentage, 0);
    }
}
