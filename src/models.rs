use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============ Requests ============

/// Body of `POST /validate-phone`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ValidatePhoneRequest {
    #[schema(example = "(415) 555-2671")]
    pub phone: Option<String>,
}

/// Body of `POST /start-verify`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StartVerifyRequest {
    #[schema(example = "(415) 555-2671")]
    pub phone: Option<String>,
}

/// Body of `POST /check-verify`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckVerifyRequest {
    #[schema(example = "(415) 555-2671")]
    pub phone: Option<String>,
    #[schema(example = "123456")]
    pub code: Option<String>,
}

// ============ Responses ============

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Returned by `/validate-phone` when the request carries no phone.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvalidRequestResponse {
    pub valid: bool,
    pub message: String,
}

impl InvalidRequestResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Result of `POST /start-verify`.
///
/// `ok` and `sent` always carry the same value; both names are in use by
/// existing form integrations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartVerifyResponse {
    pub ok: bool,
    pub sent: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StartVerifyResponse {
    pub fn new(sent: bool, status: impl Into<String>, message: Option<String>) -> Self {
        Self {
            ok: sent,
            sent,
            status: status.into(),
            message,
        }
    }
}

/// Result of `POST /check-verify`.
///
/// `ok` and `valid` always carry the same value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckVerifyResponse {
    pub ok: bool,
    pub valid: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckVerifyResponse {
    pub fn new(valid: bool, status: impl Into<String>, message: Option<String>) -> Self {
        Self {
            ok: valid,
            valid,
            status: status.into(),
            message,
        }
    }
}
