use crate::classifier::{
    ClassifierPolicy, CountryRestriction, TollFreePolicy, UnknownTypePolicy, VoipPolicy,
};
use crate::verification::VerifyChannel;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://lookups.twilio.com";
pub const DEFAULT_VERIFY_BASE_URL: &str = "https://verify.twilio.com";
pub const DEFAULT_SERVICE_NAME: &str = "phone-check-api";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Name reported by the liveness probe.
    pub service_name: String,
    pub account_sid: String,
    pub auth_token: String,
    /// Verification service identifier; the OTP endpoints need it.
    pub verify_service_sid: Option<String>,
    pub verify_channel: VerifyChannel,
    pub lookup_base_url: String,
    pub verify_base_url: String,
    /// Upper bound for every provider call.
    pub provider_timeout: Duration,
    pub policy: ClassifierPolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("service_name", &self.service_name)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("verify_service_sid", &self.verify_service_sid)
            .field("verify_channel", &self.verify_channel)
            .field("lookup_base_url", &self.lookup_base_url)
            .field("verify_base_url", &self.verify_base_url)
            .field("provider_timeout", &self.provider_timeout)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Lookup Base URL: {}", config.lookup_base_url);
        tracing::debug!("Verify Base URL: {}", config.verify_base_url);
        tracing::debug!("Provider timeout: {:?}", config.provider_timeout);
        tracing::debug!("Classifier policy: {:?}", config.policy);
        tracing::debug!("Server Port: {}", config.port);
        if config.verify_service_sid.is_none() {
            tracing::warn!(
                "TWILIO_VERIFY_SERVICE_SID not set - /start-verify and /check-verify will return 500"
            );
        }

        Ok(config)
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| anyhow::anyhow!("{} environment variable required", key))
        };

        let port = match get("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            None => 3000,
        };

        let provider_timeout = require("PROVIDER_TIMEOUT_MS").and_then(|ms| {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PROVIDER_TIMEOUT_MS must be a number of milliseconds"))?;
            if ms == 0 {
                anyhow::bail!("PROVIDER_TIMEOUT_MS must be greater than zero");
            }
            Ok(Duration::from_millis(ms))
        })?;

        let lookup_base_url = base_url(
            "TWILIO_LOOKUP_BASE_URL",
            get("TWILIO_LOOKUP_BASE_URL"),
            DEFAULT_LOOKUP_BASE_URL,
        )?;
        let verify_base_url = base_url(
            "TWILIO_VERIFY_BASE_URL",
            get("TWILIO_VERIFY_BASE_URL"),
            DEFAULT_VERIFY_BASE_URL,
        )?;

        let policy = ClassifierPolicy {
            voip: parse_or_default::<VoipPolicy>(get("VOIP_POLICY"))?,
            unknown_type: parse_or_default::<UnknownTypePolicy>(get("UNKNOWN_TYPE_POLICY"))?,
            toll_free: parse_or_default::<TollFreePolicy>(get("TOLL_FREE_POLICY"))?,
            country: parse_or_default::<CountryRestriction>(get("EXPECTED_COUNTRY"))?,
        };

        Ok(Self {
            port,
            service_name: get("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            account_sid: require("TWILIO_ACCOUNT_SID")?,
            auth_token: require("TWILIO_AUTH_TOKEN")?,
            verify_service_sid: get("TWILIO_VERIFY_SERVICE_SID").map(|s| s.trim().to_string()),
            verify_channel: parse_or_default::<VerifyChannel>(get("VERIFY_CHANNEL"))?,
            lookup_base_url,
            verify_base_url,
            provider_timeout,
            policy,
        })
    }
}

fn base_url(key: &str, value: Option<String>, default: &str) -> anyhow::Result<String> {
    let raw = value.unwrap_or_else(|| default.to_string());
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", key, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

fn parse_or_default<T>(value: Option<String>) -> anyhow::Result<T>
where
    T: FromStr + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => Ok(v.parse::<T>()?),
        None => Ok(T::default()),
    }
}
