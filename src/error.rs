//! Operator-facing error taxonomy.

use thiserror::Error;
use validator::ValidationErrors;

use crate::api::ApiError;

/// Errors surfaced by service layer operations.
///
/// The split tells the caller what to do next: `Validation` never left the
/// client, `Remote` is the backend's verdict, `Transport` means the request
/// may or may not have landed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Input rejected before any remote call was made.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Backend received the request and answered with an error status.
    #[error("remote rejected ({status}): {message}")]
    Remote {
        /// HTTP status code the backend answered with.
        status: u16,
        /// Backend-provided failure message.
        message: String,
    },
    /// Request never produced a usable response.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, detail, .. } => CoreError::Remote {
                status: status.as_u16(),
                message: detail,
            },
            ApiError::Send { path, source } => {
                CoreError::Transport(format!("sending `{path}` failed: {source}"))
            }
            ApiError::Decode { path, source } => {
                CoreError::Transport(format!("decoding `{path}` failed: {source}"))
            }
            ApiError::Unreachable { path, message } => {
                CoreError::Transport(format!("`{path}` unreachable: {message}"))
            }
            ApiError::ClientBuilder { source } => {
                CoreError::Transport(format!("building the client failed: {source}"))
            }
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(err: ValidationErrors) -> Self {
        CoreError::Validation(err.to_string())
    }
}
