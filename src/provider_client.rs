use crate::classifier::{LookupFailure, LookupResult};
use crate::config::Config;
use crate::errors::AppError;
use crate::normalizer::mask_phone;
use crate::provider_models::{LookupResponse, VerificationResponse};

/// Lookup packages requested for every number.
const LOOKUP_FIELDS: &str = "line_type_intelligence,line_status";

/// Status reported for a check against an expired or unknown verification.
pub const EXPIRED_STATUS: &str = "expired";

/// Client for the telecom-intelligence provider (Lookup + Verify).
///
/// Built once at startup and shared through `AppState`. Every request is
/// bounded by the configured provider timeout and is never retried.
#[derive(Clone)]
pub struct TelecomClient {
    client: reqwest::Client,
    lookup_base_url: String,
    verify_base_url: String,
    account_sid: String,
    auth_token: String,
}

impl TelecomClient {
    /// Creates a new `TelecomClient` from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create provider client: {}", e))
            })?;

        Ok(Self {
            client,
            lookup_base_url: config.lookup_base_url.clone(),
            verify_base_url: config.verify_base_url.clone(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Looks up line type and line status for an E.164 number.
    ///
    /// # Arguments
    ///
    /// * `e164` - The number in `+1XXXXXXXXXX` form.
    ///
    /// # Returns
    ///
    /// * `Result<LookupResult, LookupFailure>` - The provider fields or why the call failed.
    pub async fn lookup(&self, e164: &str) -> Result<LookupResult, LookupFailure> {
        let url = format!("{}/v2/PhoneNumbers/{}", self.lookup_base_url, e164);
        tracing::info!("Looking up {} with provider", mask_phone(e164));

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .query(&[("Fields", LOOKUP_FIELDS)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupFailure::Timeout
                } else {
                    LookupFailure::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LookupFailure::Status(status.as_u16(), error_text));
        }

        let data: LookupResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LookupFailure::Timeout
            } else {
                LookupFailure::Decode(e.to_string())
            }
        })?;

        Ok(data.into())
    }

    /// Starts a verification and returns the provider status (e.g. `pending`).
    pub async fn start_verification(
        &self,
        service_sid: &str,
        e164: &str,
        channel: &str,
    ) -> Result<String, AppError> {
        let url = format!(
            "{}/v2/Services/{}/Verifications",
            self.verify_base_url, service_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", e164), ("Channel", channel)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Verification start returned {}: {}",
                status, error_text
            )));
        }

        let data: VerificationResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse verification response: {}", e))
        })?;

        Ok(data.status)
    }

    /// Checks a passcode and returns the provider status (`approved` on success).
    ///
    /// The provider answers 404 once a verification has expired, been
    /// approved already, or was never started; that is reported as
    /// [`EXPIRED_STATUS`] rather than an error.
    pub async fn check_verification(
        &self,
        service_sid: &str,
        e164: &str,
        code: &str,
    ) -> Result<String, AppError> {
        let url = format!(
            "{}/v2/Services/{}/VerificationCheck",
            self.verify_base_url, service_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", e164), ("Code", code)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::info!("No pending verification for {}", mask_phone(e164));
            return Ok(EXPIRED_STATUS.to_string());
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Verification check returned {}: {}",
                status, error_text
            )));
        }

        let data: VerificationResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse verification check: {}", e))
        })?;

        Ok(data.status)
    }
}
