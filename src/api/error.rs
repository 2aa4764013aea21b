//! Error types shared by the remote judging API implementations.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`ApiError`] failures.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures that can occur while talking to the judging backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build judging API client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent at all.
    #[error("failed to send judging API request to `{path}`")]
    Send {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status code.
    #[error("judging API rejected `{path}` with status {status}: {detail}")]
    Status {
        path: String,
        status: StatusCode,
        detail: String,
    },
    /// Response payload could not be decoded into the expected model.
    #[error("failed to decode judging API response for `{path}`")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend could not be reached (used by in-process fakes).
    #[error("judging API unreachable for `{path}`: {message}")]
    Unreachable { path: String, message: String },
}
