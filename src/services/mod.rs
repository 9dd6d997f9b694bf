/// Admin service for question management.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Promotion of staged anonymous records on login.
pub mod migration_service;
/// Read-only projections of questions and statistics.
pub mod public_service;
/// Resolution of pending predictions and statistics upkeep.
pub mod reconcile_service;
/// Vote aggregation into per-option percentages.
pub mod results_service;
/// Durable store connection supervision.
pub mod storage_supervisor;
/// Vote submission and duplicate detection.
pub mod vote_service;
