//! Error types shared by the REST table-store implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the remote table API.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Required environment variable is missing.
    #[error("missing table store environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build table store client")]
    ClientBuilder {
        /// Client-level cause.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send table store request to `{path}`")]
    RequestSend {
        /// Target path of the failing request.
        path: String,
        /// Client-level cause.
        #[source]
        source: reqwest::Error,
    },
    /// The API returned an unexpected status code.
    #[error("unexpected table store response status {status} for `{path}`")]
    RequestStatus {
        /// Target path of the failing request.
        path: String,
        /// Returned HTTP status.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode table store response for `{path}`")]
    DecodeResponse {
        /// Target path of the failing request.
        path: String,
        /// Decoder-level cause.
        #[source]
        source: reqwest::Error,
    },
    /// The table schema keys vote rows by user id, so anonymous records can
    /// never be written here; they belong to the staging area.
    #[error("anonymous vote records cannot be written to the table store")]
    AnonymousVoter,
}
