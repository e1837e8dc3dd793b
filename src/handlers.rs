use crate::classifier::{classify, ReasonCode, Verdict};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::normalizer::{normalize, PhoneInput};
use crate::provider_client::TelecomClient;
use crate::verification::VerificationService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Provider client, constructed once at startup.
    pub client: TelecomClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = TelecomClient::new(&config)?;
        Ok(Self { config, client })
    }
}

/// Returns the trimmed value, or `None` when absent or blank.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalizes a phone for the OTP endpoints, mapping every failure to an input error.
fn otp_phone(phone: Option<String>) -> Result<PhoneInput, AppError> {
    let phone =
        required(phone).ok_or_else(|| AppError::BadRequest("Phone number is required".to_string()))?;
    normalize(&phone)
        .map_err(|reason| AppError::BadRequest(ReasonCode::from(reason).message().to_string()))
}

/// Liveness probe.
///
/// Returns the service status and name; no business logic.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.config.service_name.clone(),
    })
}

/// POST /validate-phone
///
/// Normalizes the phone, rejects fabricated or malformed numbers locally, and
/// otherwise classifies the provider's lookup answer.
///
/// Local rejections answer 200 with the verdict. A failed or timed-out lookup
/// answers 500 with a `reason: "error"` verdict.
#[utoipa::path(
    post,
    path = "/validate-phone",
    tag = "phone",
    request_body = ValidatePhoneRequest,
    responses(
        (status = 200, description = "Classification verdict", body = Verdict),
        (status = 400, description = "Phone missing", body = InvalidRequestResponse),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Provider error", body = Verdict)
    )
)]
pub async fn validate_phone(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidatePhoneRequest>, JsonRejection>,
) -> Response {
    let phone = match payload {
        Ok(Json(request)) => required(request.phone),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return AppError::from(rejection).into_response();
        }
        Err(rejection) => {
            tracing::debug!("Rejected /validate-phone body: {}", rejection);
            None
        }
    };

    let Some(phone) = phone else {
        return (
            StatusCode::BAD_REQUEST,
            Json(InvalidRequestResponse::new("Phone number is required")),
        )
            .into_response();
    };

    let input = match normalize(&phone) {
        Ok(input) => input,
        Err(reason) => {
            tracing::info!("Phone rejected locally: {}", reason.code());
            return (StatusCode::OK, Json(Verdict::rejected(reason))).into_response();
        }
    };

    let lookup = state.client.lookup(input.e164()).await;
    let verdict = classify(&input, &lookup, &state.config.policy);

    tracing::info!(
        "POST /validate-phone {} -> valid: {}, reason: {}",
        input.masked(),
        verdict.valid,
        verdict.reason
    );

    let status = if verdict.reason == ReasonCode::Error {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status, Json(verdict)).into_response()
}

/// POST /start-verify
///
/// Sends a one-time passcode to the normalized number.
#[utoipa::path(
    post,
    path = "/start-verify",
    tag = "verify",
    request_body = StartVerifyRequest,
    responses(
        (status = 200, description = "Provider status for the new verification", body = StartVerifyResponse),
        (status = 400, description = "Phone missing or rejected", body = StartVerifyResponse),
        (status = 500, description = "Not configured or provider error", body = StartVerifyResponse)
    )
)]
pub async fn start_verify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartVerifyRequest>, JsonRejection>,
) -> (StatusCode, Json<StartVerifyResponse>) {
    match start_verify_inner(&state, payload).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(err) => {
            err.log();
            (
                err.status_code(),
                Json(StartVerifyResponse::new(
                    false,
                    err.status_label(),
                    Some(err.public_message()),
                )),
            )
        }
    }
}

async fn start_verify_inner(
    state: &AppState,
    payload: Result<Json<StartVerifyRequest>, JsonRejection>,
) -> Result<StartVerifyResponse, AppError> {
    let Json(request) = payload?;
    let input = otp_phone(request.phone)?;

    let service = VerificationService::new(&state.client, &state.config);
    let outcome = service.start_verification(input.e164()).await?;

    let message = if outcome.accepted {
        "Verification code sent."
    } else {
        "Verification could not be started."
    };

    Ok(StartVerifyResponse::new(
        outcome.accepted,
        outcome.provider_status,
        Some(message.to_string()),
    ))
}

/// POST /check-verify
///
/// Checks a passcode. Approval is decided by the provider alone.
#[utoipa::path(
    post,
    path = "/check-verify",
    tag = "verify",
    request_body = CheckVerifyRequest,
    responses(
        (status = 200, description = "Provider decision for the code", body = CheckVerifyResponse),
        (status = 400, description = "Phone or code missing", body = CheckVerifyResponse),
        (status = 500, description = "Not configured or provider error", body = CheckVerifyResponse)
    )
)]
pub async fn check_verify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckVerifyRequest>, JsonRejection>,
) -> (StatusCode, Json<CheckVerifyResponse>) {
    match check_verify_inner(&state, payload).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(err) => {
            err.log();
            (
                err.status_code(),
                Json(CheckVerifyResponse::new(
                    false,
                    err.status_label(),
                    Some(err.public_message()),
                )),
            )
        }
    }
}

async fn check_verify_inner(
    state: &AppState,
    payload: Result<Json<CheckVerifyRequest>, JsonRejection>,
) -> Result<CheckVerifyResponse, AppError> {
    let Json(request) = payload?;
    let input = otp_phone(request.phone)?;

    let service = VerificationService::new(&state.client, &state.config);
    let outcome = service
        .check_verification(input.e164(), request.code.as_deref().unwrap_or_default())
        .await?;

    let message = if outcome.approved {
        "Phone number verified."
    } else {
        "Invalid or expired code."
    };

    Ok(CheckVerifyResponse::new(
        outcome.approved,
        outcome.provider_status,
        Some(message.to_string()),
    ))
}
