//! Promotion of staged anonymous records into an authenticated account.
//!
//! Triggered when a browser that voted anonymously logs in. The merge is a
//! set-union keyed by question id: durable records are never overwritten, and
//! staged copies are cleared once the durable side holds the answer.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{UserStatsEntity, VoteRecordEntity, VoterIdentity},
    dto::public::ClaimResponse,
    error::ServiceError,
    state::SharedState,
};

/// Merge every staged record of `anon_id` into the account `user_id`.
///
/// Records for questions the account already answered are dropped without
/// overwrite. Each staged record leaves the staging area only once its
/// durable fate is settled, so a retried claim after a storage failure never
/// duplicates a vote.
pub async fn claim_records(
    state: &SharedState,
    anon_id: &str,
    user_id: Uuid,
) -> Result<ClaimResponse, ServiceError> {
    let store = state.require_poll_store().await?;

    // First login creates the zeroed statistics row.
    if store.find_stats(user_id).await?.is_none() {
        store.save_stats(UserStatsEntity::new(user_id)).await?;
    }

    let staged = state.anon_stage().records_for_identity(anon_id);

    let mut migrated = 0;
    let mut skipped = 0;

    for record in staged {
        let question_id = record.question_id;

        if store.find_vote(question_id, user_id).await?.is_some() {
            skipped += 1;
            state.anon_stage().remove(anon_id, question_id);
            continue;
        }

        let promoted = VoteRecordEntity {
            voter: VoterIdentity::User(user_id),
            ..record
        };
        store.insert_vote(promoted).await?;
        state.anon_stage().remove(anon_id, question_id);
        migrated += 1;
    }

    if migrated > 0 || skipped > 0 {
        info!(user_id = %user_id, migrated, skipped, "claimed staged records");
    }

    Ok(ClaimResponse { migrated, skipped })
}
