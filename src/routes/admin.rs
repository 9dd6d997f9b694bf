//! Admin-only endpoints for managing the question calendar.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::admin::{ActionResponse, AdminQuestionView, CreateQuestionResponse, QuestionPayload},
    error::AppError,
    services::admin_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only management endpoints, guarded by the shared token header.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/questions", get(list_questions).post(create_question))
        .route(
            "/admin/questions/{id}",
            put(update_question).delete(delete_question),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

#[utoipa::path(
    get,
    path = "/admin/questions",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token from the server configuration")),
    responses((status = 200, description = "All questions with lifecycle status", body = [AdminQuestionView]))
)]
/// Retrieve every question, newest first, with lifecycle and date flags.
pub async fn list_questions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AdminQuestionView>>, AppError> {
    Ok(Json(admin_service::list_questions(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/questions",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token from the server configuration")),
    request_body = QuestionPayload,
    responses(
        (status = 200, description = "Question created", body = CreateQuestionResponse),
        (status = 400, description = "Invalid choices or duplicate date")
    )
)]
/// Create a question on a date with no question yet.
pub async fn create_question(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<QuestionPayload>>,
) -> Result<Json<CreateQuestionResponse>, AppError> {
    Ok(Json(admin_service::create_question(&state, payload).await?))
}

#[utoipa::path(
    put,
    path = "/admin/questions/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token from the server configuration"),
    ("id" = Uuid, Path, description = "Identifier of the question to update")),
    request_body = QuestionPayload,
    responses(
        (status = 200, description = "Question updated", body = ActionResponse),
        (status = 404, description = "Question not found")
    )
)]
/// Replace the date, text, and choices of an existing question.
pub async fn update_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<QuestionPayload>>,
) -> Result<Json<ActionResponse>, AppError> {
    admin_service::update_question(&state, id, payload).await?;
    Ok(Json(ActionResponse { success: true }))
}

#[utoipa::path(
    delete,
    path = "/admin/questions/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token from the server configuration"),
    ("id" = Uuid, Path, description = "Identifier of the question to delete")),
    responses(
        (status = 204, description = "Question and its vote records deleted"),
        (status = 404, description = "Question not found")
    )
)]
/// Delete a question, cascading to all of its vote records.
pub async fn delete_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_question(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if provided == state.config().admin_token {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin token".into()))
    }
}
