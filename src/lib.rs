//! Library crate for predict-people-back, exposing modules for binaries and
//! integration tests.

/// Civil-date resolution in the reference timezone.
pub mod clock;
/// Runtime configuration loading.
pub mod config;
/// Persistence layer: entities, staging area, and durable backends.
pub mod dao;
/// Wire-level request and response shapes.
pub mod dto;
/// Error taxonomy for the service and HTTP layers.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Business logic services.
pub mod services;
/// Shared state and the lifecycle engine.
pub mod state;
