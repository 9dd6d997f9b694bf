/// Staging area for anonymous vote records.
pub mod anon_stage;
/// Entity definitions shared across layers.
pub mod models;
/// Durable storage backends for questions, votes, and statistics.
pub mod poll_store;
/// Storage abstraction layer shared by all backends.
pub mod storage;
