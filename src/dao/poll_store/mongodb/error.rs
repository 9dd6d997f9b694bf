//! Error types for the MongoDB storage implementation.

use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Required environment variable is missing.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Connection string could not be parsed.
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        /// Offending connection string.
        uri: String,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Client construction failed before any network traffic.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// The initial ping never succeeded within the retry budget.
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        /// Number of attempts made.
        attempts: u32,
        /// Driver-level cause of the last attempt.
        #[source]
        source: mongodb::error::Error,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB health ping failed")]
    HealthPing {
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Creating an index failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Index description.
        index: &'static str,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Persisting a question failed.
    #[error("failed to save question `{id}`")]
    SaveQuestion {
        /// Question identifier.
        id: Uuid,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Loading or listing questions failed.
    #[error("failed to load questions")]
    LoadQuestions {
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Deleting a question failed.
    #[error("failed to delete question `{id}`")]
    DeleteQuestion {
        /// Question identifier.
        id: Uuid,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Persisting a vote record failed.
    #[error("failed to save vote for question `{question_id}`")]
    SaveVote {
        /// Question the vote belongs to.
        question_id: Uuid,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Loading vote records failed.
    #[error("failed to load votes for question `{question_id}`")]
    LoadVotes {
        /// Question the votes belong to.
        question_id: Uuid,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Persisting user statistics failed.
    #[error("failed to save statistics for user `{user_id}`")]
    SaveStats {
        /// Owner of the statistics.
        user_id: Uuid,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// Loading user statistics failed.
    #[error("failed to load statistics for user `{user_id}`")]
    LoadStats {
        /// Owner of the statistics.
        user_id: Uuid,
        /// Driver-level cause.
        #[source]
        source: mongodb::error::Error,
    },
    /// A stored civil date could not be parsed back.
    #[error("invalid stored date `{value}`")]
    DecodeDate {
        /// Offending column value.
        value: String,
        /// Parser-level cause.
        #[source]
        source: time::error::Parse,
    },
}
