//! OpenAPI documentation generation.

use utoipa::OpenApi;

/// Aggregated OpenAPI specification for the daily-poll backend.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::get_today,
        crate::routes::public::get_question,
        crate::routes::public::get_past_questions,
        crate::routes::public::post_vote,
        crate::routes::public::get_results,
        crate::routes::public::get_stats,
        crate::routes::public::post_claim,
        crate::routes::admin::list_questions,
        crate::routes::admin::create_question,
        crate::routes::admin::update_question,
        crate::routes::admin::delete_question,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisiblePhase,
            crate::dto::public::QuestionWithStatus,
            crate::dto::public::ClaimResponse,
            crate::dto::vote::VoteRequest,
            crate::dto::vote::VoteResponse,
            crate::dto::results::ChoiceResult,
            crate::dto::results::ResultsResponse,
            crate::dto::stats::StatsResponse,
            crate::dto::admin::QuestionPayload,
            crate::dto::admin::CreateQuestionResponse,
            crate::dto::admin::ActionResponse,
            crate::dto::admin::AdminQuestionView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Daily question, voting, and results"),
        (name = "admin", description = "Question management"),
    )
)]
pub struct ApiDoc;
