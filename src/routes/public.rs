//! Public endpoints: daily question, voting, results, and statistics.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dao::models::CallerIdentity,
    dto::{
        public::{ClaimResponse, QuestionWithStatus},
        results::ResultsResponse,
        stats::StatsResponse,
        vote::{VoteRequest, VoteResponse},
    },
    error::AppError,
    routes::identity::{anon_cookie, mint_anon_id},
    services::{migration_service, public_service, results_service, vote_service},
    state::SharedState,
};

/// Public endpoints exposed to the poll clients.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/today", get(get_today))
        .route("/questions/{id}", get(get_question))
        .route("/past-questions", get(get_past_questions))
        .route("/vote", post(post_vote))
        .route("/results/{id}", get(get_results))
        .route("/stats", get(get_stats))
        .route("/session/claim", post(post_claim))
}

#[utoipa::path(
    get,
    path = "/today",
    tag = "public",
    responses(
        (status = 200, description = "Today's question with its lifecycle status", body = QuestionWithStatus),
        (status = 404, description = "No question published for today")
    )
)]
/// Return today's question together with its lifecycle classification.
pub async fn get_today(
    State(state): State<SharedState>,
) -> Result<Json<QuestionWithStatus>, AppError> {
    let payload = public_service::today_question(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/questions/{id}",
    tag = "public",
    params(("id" = Uuid, Path, description = "Identifier of the question")),
    responses(
        (status = 200, description = "Question with its lifecycle status", body = QuestionWithStatus),
        (status = 404, description = "Question not found")
    )
)]
/// Return one question by id together with its lifecycle classification.
pub async fn get_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionWithStatus>, AppError> {
    let payload = public_service::question_by_id(&state, id).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/past-questions",
    tag = "public",
    responses((status = 200, description = "Most recent questions before today", body = [QuestionWithStatus]))
)]
/// Return the most recent questions published strictly before today.
pub async fn get_past_questions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuestionWithStatus>>, AppError> {
    let payload = public_service::past_questions(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    post,
    path = "/vote",
    tag = "public",
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote accepted", body = VoteResponse),
        (status = 403, description = "Voting window expired"),
        (status = 409, description = "Identity already answered this question")
    )
)]
/// Accept an answer and majority guess for the calling identity.
///
/// Browsers presenting no identity at all are assigned a fresh pseudo-
/// identity via a long-lived `anon_id` cookie on the response.
pub async fn post_vote(
    State(state): State<SharedState>,
    mut caller: CallerIdentity,
    Valid(Json(request)): Valid<Json<VoteRequest>>,
) -> Result<Response, AppError> {
    let minted = if caller.user.is_none() && caller.anon_id.is_none() {
        let id = mint_anon_id();
        caller.anon_id = Some(id.clone());
        Some(id)
    } else {
        None
    };

    vote_service::submit_vote(&state, &caller, request).await?;

    let body = Json(VoteResponse { success: true });
    match minted {
        Some(id) => {
            let cookie = anon_cookie(&id, state.config().anon_cookie_ttl_days);
            Ok(([(header::SET_COOKIE, cookie)], body).into_response())
        }
        None => Ok(body.into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/results/{id}",
    tag = "public",
    params(("id" = Uuid, Path, description = "Identifier of the question")),
    responses(
        (status = 200, description = "Aggregated results, or the remaining wait while locked", body = ResultsResponse),
        (status = 404, description = "Question not found")
    )
)]
/// Return the aggregated results for one question.
///
/// While the voting window is open this returns a locked payload with the
/// remaining wait. Reading unlocked results lazily reconciles the calling
/// authenticated user's pending prediction.
pub async fn get_results(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    caller: CallerIdentity,
) -> Result<Json<ResultsResponse>, AppError> {
    let payload = results_service::question_results(&state, id, &caller).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "public",
    responses(
        (status = 200, description = "The caller's cumulative prediction statistics", body = StatsResponse),
        (status = 401, description = "No authenticated identity presented")
    )
)]
/// Return the calling user's cumulative statistics.
pub async fn get_stats(
    State(state): State<SharedState>,
    caller: CallerIdentity,
) -> Result<Json<StatsResponse>, AppError> {
    let user_id = caller
        .user
        .ok_or_else(|| AppError::Unauthorized("statistics require a logged-in user".into()))?;
    let payload = public_service::user_stats(&state, user_id).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    post,
    path = "/session/claim",
    tag = "public",
    responses(
        (status = 200, description = "Staged records merged into the account", body = ClaimResponse),
        (status = 401, description = "No authenticated identity presented")
    )
)]
/// Merge the browser's staged anonymous records into the caller's account.
pub async fn post_claim(
    State(state): State<SharedState>,
    caller: CallerIdentity,
) -> Result<Json<ClaimResponse>, AppError> {
    let user_id = caller
        .user
        .ok_or_else(|| AppError::Unauthorized("claiming records requires a logged-in user".into()))?;
    let Some(anon_id) = caller.anon_id else {
        // Nothing staged without a browser identity; report an empty merge.
        return Ok(Json(ClaimResponse {
            migrated: 0,
            skipped: 0,
        }));
    };

    let payload = migration_service::claim_records(&state, &anon_id, user_id).await?;
    Ok(Json(payload))
}
