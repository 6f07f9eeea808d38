//! Error handling for the control plane and process bootstrap
//!
//! Every fallible operation in the crate returns [`AppError`]. Errors that reach
//! an axum handler are rendered as RFC 7807 problem documents with the status
//! code given by [`AppError::status_code`]. Probe failures never show up here:
//! they are absorbed by the probers and recorded as `"500"` results.

pub mod types;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

tokio::task_local! {
    /// ID of the request currently being served, set by the tracing middleware.
    pub static REQUEST_ID: Uuid;
}

/// The ID of the request being served, if any.
pub fn current_request_id() -> Option<Uuid> {
    REQUEST_ID.try_with(|id| *id).ok()
}

/// Standard error response format following RFC 7807 Problem Details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    pub detail: String,

    /// A URI reference that identifies the specific occurrence
    pub instance: String,

    /// Request ID for tracing
    pub request_id: Option<String>,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String, line: Option<usize> },

    // Control plane errors
    #[error("Already started!")]
    AlreadyRunning,

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Failed to read request body: {message}")]
    BodyRead { message: String },

    #[error("Request body too large (max: {max_size} bytes)")]
    RequestTooLarge { max_size: usize },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    // Process and runtime errors
    #[error("Cannot create pid file {path}: {message}")]
    PidFile { path: String, message: String },

    #[error("Failed to build HTTP client: {message}")]
    HttpClientBuild { message: String },

    #[error("IO operation failed: {operation} - {message}")]
    Io { operation: String, message: String },
}

impl AppError {
    /// Create a new configuration validation error
    pub fn config_validation(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            field: field.map(Into::into),
        }
    }

    /// Create a new invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::AlreadyRunning | Self::InvalidRequest { .. } | Self::ConfigParse { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            Self::ConfigNotFound { .. } => StatusCode::NOT_FOUND,

            // 413 Payload Too Large
            Self::RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error
            Self::BodyRead { .. }
            | Self::Serialization { .. }
            | Self::ConfigValidation { .. }
            | Self::PidFile { .. }
            | Self::HttpClientBuild { .. }
            | Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type URI for RFC 7807 compliance
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ConfigValidation { .. } | Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => {
                "https://drroute.dev/errors/configuration"
            }
            Self::AlreadyRunning => "https://drroute.dev/errors/already-running",
            Self::InvalidRequest { .. } | Self::BodyRead { .. } | Self::RequestTooLarge { .. } => {
                "https://drroute.dev/errors/validation"
            }
            Self::Serialization { .. } => "https://drroute.dev/errors/serialization",
            _ => "https://drroute.dev/errors/internal",
        }
    }

    /// Get a human-readable title for the error
    pub fn title(&self) -> &'static str {
        match self {
            Self::ConfigValidation { .. } | Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => {
                "Configuration Error"
            }
            Self::AlreadyRunning => "Poller Already Running",
            Self::InvalidRequest { .. } | Self::BodyRead { .. } | Self::RequestTooLarge { .. } => {
                "Validation Error"
            }
            Self::Serialization { .. } => "Serialization Error",
            _ => "Internal Server Error",
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self, request_id: Option<&str>) {
        let request_id = request_id.unwrap_or("unknown");

        if self.status_code().is_server_error() {
            error!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Application error occurred"
            );
        } else {
            warn!(
                error = %self,
                request_id = request_id,
                error_type = self.error_type(),
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = current_request_id().unwrap_or_else(Uuid::new_v4).to_string();

        self.log(Some(&request_id));

        let status = self.status_code();
        let error_response = ErrorResponse {
            error_type: self.error_type().to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail: self.to_string(),
            instance: format!("/errors/{request_id}"),
            request_id: Some(request_id),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
