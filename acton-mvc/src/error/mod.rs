//! Error types and error handling

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::controller::InvalidParams;

/// Errors raised while dispatching controller actions
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No inline handler or declared action matches the requested id
    #[error("Unable to resolve the request: action \"{0}\" not found")]
    ActionNotFound(String),

    /// The request parameters could not be bound to the action
    #[error("Bad request: {0}")]
    InvalidParams(#[from] InvalidParams),

    /// An inline action was registered under an id that can never resolve
    #[error("Invalid action id: \"{0}\"")]
    InvalidActionId(String),

    /// A qualified route was forwarded without an application dispatcher
    #[error("No application dispatcher configured to handle route \"{0}\"")]
    NoApplication(String),

    /// A hook observer failed
    #[error("Hook error: {0}")]
    Hook(#[source] anyhow::Error),

    /// The action body failed
    #[error("Action error: {0}")]
    Action(#[source] anyhow::Error),

    /// View rendering failed
    #[error("View error: {0}")]
    View(#[source] anyhow::Error),
}

impl DispatchError {
    /// HTTP status a user-facing response for this error should carry
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ActionNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidParams(_) => StatusCode::BAD_REQUEST,
            Self::InvalidActionId(_)
            | Self::NoApplication(_)
            | Self::Hook(_)
            | Self::Action(_)
            | Self::View(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is the caller's fault (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request dispatch failed");
            (status, "Internal server error").into_response()
        } else {
            (status, self.to_string()).into_response()
        }
    }
}
