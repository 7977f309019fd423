use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failure reported by one of the AWS collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed ({kind}): {message}")]
pub struct ServiceError {
    /// API operation that failed, e.g. `SubmitJob`.
    pub operation: &'static str,
    /// Service error code, or the SDK failure class when the call never got a response.
    pub kind: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(operation: &'static str, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("Invalid value for {keyword}: {value:?} is not an integer")]
    InvalidOverrideValue { keyword: &'static str, value: String },

    #[error(transparent)]
    Downstream(#[from] ServiceError),
}

impl HookError {
    /// Category reported as `errorType` in 500 responses.
    pub fn error_type(&self) -> &str {
        match self {
            HookError::Unauthorized => "Unauthorized",
            HookError::MalformedInput(_) => "MalformedInput",
            HookError::InvalidOverrideValue { .. } => "InvalidOverrideValue",
            HookError::Downstream(e) => &e.kind,
        }
    }
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        if let HookError::Unauthorized = self {
            return StatusCode::UNAUTHORIZED.into_response();
        }

        tracing::error!("Webhook processing failed ({}): {}", self.error_type(), self);
        let body = serde_json::json!({
            "errorMessage": self.to_string(),
            "errorType": self.error_type(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, HookError>;
