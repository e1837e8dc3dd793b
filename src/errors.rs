use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// The variants follow the service's error taxonomy: `BadRequest` is the
/// user-correctable input error, `NotConfigured` the configuration error and
/// `ExternalApiError` the provider error.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Missing or malformed phone/code (user-correctable).
    BadRequest(String),
    /// Request body exceeds the accepted size.
    PayloadTooLarge(String),
    /// A required credential or identifier is not configured.
    NotConfigured(String),
    /// Network failure, timeout or non-success answer from the provider.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// The innermost error, skipping any context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.root() {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotConfigured(_)
            | AppError::ExternalApiError(_)
            | AppError::InternalError(_)
            | AppError::WithContext { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short status label placed in response bodies.
    pub fn status_label(&self) -> &'static str {
        match self.root() {
            AppError::BadRequest(_) => "invalid-request",
            AppError::PayloadTooLarge(_) => "payload-too-large",
            AppError::NotConfigured(_) => "not-configured",
            AppError::ExternalApiError(_) => "error",
            AppError::InternalError(_) | AppError::WithContext { .. } => "internal-error",
        }
    }

    /// Message that is safe to return to callers.
    ///
    /// Input errors are echoed; everything else gets a generic message and is
    /// only detailed in the logs.
    pub fn public_message(&self) -> String {
        match self.root() {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::PayloadTooLarge(_) => "Request body is too large".to_string(),
            AppError::NotConfigured(_) => "Phone verification is not configured".to_string(),
            AppError::ExternalApiError(_) => "Verification provider error".to_string(),
            AppError::InternalError(_) | AppError::WithContext { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    /// Log the error at a level matching its severity.
    pub fn log(&self) {
        match self.root() {
            AppError::BadRequest(msg) => tracing::debug!("Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => tracing::warn!("Payload too large: {}", msg),
            AppError::NotConfigured(_) => tracing::error!("Configuration error: {}", self),
            AppError::ExternalApiError(_) => tracing::error!("External API error: {}", self),
            AppError::InternalError(_) | AppError::WithContext { .. } => {
                tracing::error!("Internal error: {}", self)
            }
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::NotConfigured(msg) => write!(f, "Not configured: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "ok": false,
            "status": self.status_label(),
            "message": self.public_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    /// Maps a JSON body rejection to an input error, keeping the size limit distinct.
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::ExternalApiError(format!("request timed out: {}", err))
        } else {
            AppError::ExternalApiError(err.to_string())
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
