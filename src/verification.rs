//! One-time passcode sessions.
//!
//! A pure pass-through to the provider's verification service: this module
//! only checks that the inputs are present and the service is configured.
//! No state is kept between start and check.

use crate::classifier::PolicyParseError;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::normalizer::mask_phone;
use crate::provider_client::TelecomClient;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Provider verification codes are 4-10 digits.
static CODE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,10}$").expect("valid code regex"));

/// Delivery channel for the passcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyChannel {
    #[default]
    Sms,
    Call,
    Whatsapp,
}

impl VerifyChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyChannel::Sms => "sms",
            VerifyChannel::Call => "call",
            VerifyChannel::Whatsapp => "whatsapp",
        }
    }
}

impl FromStr for VerifyChannel {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sms" => Ok(VerifyChannel::Sms),
            "call" => Ok(VerifyChannel::Call),
            "whatsapp" => Ok(VerifyChannel::Whatsapp),
            other => Err(PolicyParseError {
                field: "verification channel",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum VerificationError {
    /// No verification service identifier is configured.
    NotConfigured,
    /// The passcode was empty.
    MissingCode,
    /// The passcode is not 4-10 digits.
    MalformedCode,
    /// The provider call failed.
    Provider(AppError),
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationError::NotConfigured => write!(f, "verification service is not configured"),
            VerificationError::MissingCode => write!(f, "verification code is required"),
            VerificationError::MalformedCode => {
                write!(f, "verification code must be 4-10 digits")
            }
            VerificationError::Provider(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for VerificationError {}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::NotConfigured => AppError::NotConfigured(err.to_string()),
            VerificationError::MissingCode | VerificationError::MalformedCode => {
                AppError::BadRequest(err.to_string())
            }
            VerificationError::Provider(e) => e,
        }
    }
}

/// Result of starting a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub accepted: bool,
    /// Provider status, unchanged (e.g. `pending`).
    pub provider_status: String,
}

/// Result of checking a passcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub approved: bool,
    pub provider_status: String,
}

/// Per-request view over the provider's verification service.
pub struct VerificationService<'a> {
    client: &'a TelecomClient,
    service_sid: Option<&'a str>,
    channel: VerifyChannel,
}

impl<'a> VerificationService<'a> {
    pub fn new(client: &'a TelecomClient, config: &'a Config) -> Self {
        Self {
            client,
            service_sid: config.verify_service_sid.as_deref(),
            channel: config.verify_channel,
        }
    }

    fn service_sid(&self) -> Result<&'a str, VerificationError> {
        self.service_sid.ok_or(VerificationError::NotConfigured)
    }

    /// Send a passcode to `e164`.
    ///
    /// The provider's status is returned as-is; anything other than
    /// `canceled`/`failed` counts as accepted.
    pub async fn start_verification(&self, e164: &str) -> Result<StartOutcome, VerificationError> {
        let service_sid = self.service_sid()?;

        tracing::info!(
            "Starting {} verification for {}",
            self.channel.as_str(),
            mask_phone(e164)
        );

        let status = self
            .client
            .start_verification(service_sid, e164, self.channel.as_str())
            .await
            .context("Failed to start verification")
            .map_err(VerificationError::Provider)?;

        let accepted = !matches!(status.to_ascii_lowercase().as_str(), "canceled" | "failed");
        tracing::info!("Verification for {} started: {}", mask_phone(e164), status);

        Ok(StartOutcome {
            accepted,
            provider_status: status,
        })
    }

    /// Check `code` for `e164`.
    ///
    /// Input is validated before the service lookup, so a missing code is
    /// reported without contacting the provider.
    pub async fn check_verification(
        &self,
        e164: &str,
        code: &str,
    ) -> Result<CheckOutcome, VerificationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(VerificationError::MissingCode);
        }
        if !CODE_FORMAT.is_match(code) {
            return Err(VerificationError::MalformedCode);
        }

        let service_sid = self.service_sid()?;

        let status = self
            .client
            .check_verification(service_sid, e164, code)
            .await
            .with_context(|| format!("Failed to check verification for {}", mask_phone(e164)))
            .map_err(VerificationError::Provider)?;

        let approved = status.eq_ignore_ascii_case("approved");
        tracing::info!(
            "Verification check for {}: {} (approved: {})",
            mask_phone(e164),
            status,
            approved
        );

        Ok(CheckOutcome {
            approved,
            provider_status: status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parsing() {
        assert_eq!("SMS".parse::<VerifyChannel>().unwrap(), VerifyChannel::Sms);
        assert_eq!("whatsapp".parse::<VerifyChannel>().unwrap(), VerifyChannel::Whatsapp);
        assert!("pigeon".parse::<VerifyChannel>().is_err());
    }

    #[test]
    fn test_error_mapping() {
        let err: AppError = VerificationError::MissingCode.into();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let err: AppError = VerificationError::NotConfigured.into();
        assert_eq!(err.status_label(), "not-configured");
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_code_format() {
        assert!(CODE_FORMAT.is_match("1234"));
        assert!(CODE_FORMAT.is_match("0123456789"));
        assert!(!CODE_FORMAT.is_match("123"));
        assert!(!CODE_FORMAT.is_match("12a456"));
    }
}
