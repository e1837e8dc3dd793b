//! Phone validity classifier.
//!
//! Applies a fixed, top-to-bottom rule table to the provider's lookup answer
//! and produces the flat [`Verdict`] returned to form callers. The rule table
//! has a few product-policy knobs collected in [`ClassifierPolicy`].

use crate::normalizer::{PhoneInput, RejectReason};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// North American toll-free area codes.
pub const TOLL_FREE_AREA_CODES: [&str; 7] = ["800", "833", "844", "855", "866", "877", "888"];

/// Line types that are always recognized, independent of policy.
const KNOWN_LINE_TYPES: [&str; 3] = ["mobile", "landline", "fixed"];

/// Provider labels that denote a VOIP line.
const VOIP_LINE_TYPES: [&str; 3] = ["voip", "fixedvoip", "nonfixedvoip"];

/// Provider labels that denote a toll-free line.
const TOLL_FREE_LINE_TYPES: [&str; 3] = ["tollfree", "toll-free", "toll_free"];

/// Line-status values that count as an active line.
const ACTIVE_STATUSES: [&str; 2] = ["active", "reachable"];

// ============ Policy ============

/// How VOIP numbers are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoipPolicy {
    #[default]
    Block,
    Allow,
    /// Accept VOIP only when the provider reports the line as active/reachable.
    AllowIfActive,
}

/// How line types outside the recognized set are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTypePolicy {
    Accept,
    #[default]
    Reject,
}

/// Whether toll-free numbers are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TollFreePolicy {
    #[default]
    Block,
    Allow,
}

/// Which provider-reported country is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryRestriction {
    Any,
    /// ISO country code, stored uppercase.
    Only(String),
}

impl Default for CountryRestriction {
    fn default() -> Self {
        CountryRestriction::Only("US".to_string())
    }
}

/// Error returned when a policy value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyParseError {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for PolicyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} value: '{}'", self.field, self.value)
    }
}

impl std::error::Error for PolicyParseError {}

impl FromStr for VoipPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(VoipPolicy::Block),
            "allow" => Ok(VoipPolicy::Allow),
            "allow-if-active" => Ok(VoipPolicy::AllowIfActive),
            other => Err(PolicyParseError {
                field: "VOIP policy",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for UnknownTypePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" | "valid" => Ok(UnknownTypePolicy::Accept),
            "reject" | "invalid" => Ok(UnknownTypePolicy::Reject),
            other => Err(PolicyParseError {
                field: "unknown-type policy",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for TollFreePolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(TollFreePolicy::Block),
            "allow" => Ok(TollFreePolicy::Allow),
            other => Err(PolicyParseError {
                field: "toll-free policy",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for CountryRestriction {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("any") {
            return Ok(CountryRestriction::Any);
        }
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(CountryRestriction::Only(trimmed.to_ascii_uppercase()));
        }
        Err(PolicyParseError {
            field: "expected country",
            value: trimmed.to_string(),
        })
    }
}

/// The full set of product-policy choices applied by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassifierPolicy {
    pub voip: VoipPolicy,
    pub unknown_type: UnknownTypePolicy,
    pub toll_free: TollFreePolicy,
    pub country: CountryRestriction,
}

// ============ Lookup input ============

/// Fields taken from the provider's lookup response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// ISO country code, when reported.
    pub country_code: Option<String>,
    /// Provider line type label (compared case-insensitively).
    pub line_type: Option<String>,
    /// Line status / reachability label (compared case-insensitively).
    pub reachability: Option<String>,
}

/// Why the lookup call produced no usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The bounded timeout elapsed.
    Timeout,
    /// Connection-level failure.
    Transport(String),
    /// Provider answered with a non-success status.
    Status(u16, String),
    /// Provider body could not be decoded.
    Decode(String),
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::Timeout => write!(f, "lookup timed out"),
            LookupFailure::Transport(msg) => write!(f, "lookup transport error: {}", msg),
            LookupFailure::Status(status, body) => {
                write!(f, "lookup returned {}: {}", status, body)
            }
            LookupFailure::Decode(msg) => write!(f, "failed to decode lookup response: {}", msg),
        }
    }
}

impl std::error::Error for LookupFailure {}

// ============ Verdict ============

/// Machine-readable reason attached to every verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCode {
    Error,
    BadLength,
    FakePattern,
    NonUs,
    Unreachable,
    Voip,
    TollFree,
    UnknownType,
    Ok,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Error => "error",
            ReasonCode::BadLength => "bad-length",
            ReasonCode::FakePattern => "fake-pattern",
            ReasonCode::NonUs => "non-us",
            ReasonCode::Unreachable => "unreachable",
            ReasonCode::Voip => "voip",
            ReasonCode::TollFree => "toll-free",
            ReasonCode::UnknownType => "unknown-type",
            ReasonCode::Ok => "ok",
        }
    }

    /// Fixed human-readable message shown by form callers.
    pub fn message(&self) -> &'static str {
        match self {
            ReasonCode::Error => "We could not verify this phone number right now. Please try again.",
            ReasonCode::BadLength => "Please enter a 10-digit phone number.",
            ReasonCode::FakePattern => "Please enter a real phone number.",
            ReasonCode::NonUs => "Phone numbers from this country are not accepted.",
            ReasonCode::Unreachable => "This phone number is not currently in service.",
            ReasonCode::Voip => "Internet (VOIP) phone numbers are not accepted. Please use a mobile or landline number.",
            ReasonCode::TollFree => "Toll-free numbers are not accepted. Please use a personal phone number.",
            ReasonCode::UnknownType => "We could not confirm this phone number type. Please use a mobile or landline number.",
            ReasonCode::Ok => "Phone number is valid.",
        }
    }
}

impl From<RejectReason> for ReasonCode {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::BadLength => ReasonCode::BadLength,
            RejectReason::FakePattern => ReasonCode::FakePattern,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat accept/reject answer for a phone number. The JSON shape is part of
/// the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub valid: bool,
    /// Lowercased line type, or `"unknown"`.
    #[serde(rename = "type")]
    pub line_type: String,
    pub country_code: Option<String>,
    pub reachability: Option<String>,
    pub reason: ReasonCode,
    pub message: String,
}

impl Verdict {
    fn new(
        reason: ReasonCode,
        line_type: String,
        country_code: Option<String>,
        reachability: Option<String>,
    ) -> Self {
        Self {
            valid: reason == ReasonCode::Ok,
            line_type,
            country_code,
            reachability,
            reason,
            message: reason.message().to_string(),
        }
    }

    /// Verdict for a number the normalizer rejected; no lookup is involved.
    pub fn rejected(reason: RejectReason) -> Self {
        Self::new(reason.into(), "unknown".to_string(), None, None)
    }

    /// Verdict for a failed or timed-out provider call.
    pub fn provider_error() -> Self {
        Self::new(ReasonCode::Error, "unknown".to_string(), None, None)
    }
}

// ============ Rule table ============

/// Classify a normalized number against the provider's lookup answer.
///
/// Rules are evaluated top to bottom and the first match wins:
/// provider failure, country, reachability, VOIP, toll-free, unknown type.
/// Local normalizer rejections are turned into verdicts with [`Verdict::rejected`].
pub fn classify(
    input: &PhoneInput,
    lookup: &Result<LookupResult, LookupFailure>,
    policy: &ClassifierPolicy,
) -> Verdict {
    let result = match lookup {
        Ok(result) => result,
        Err(failure) => {
            tracing::warn!("Lookup failed for {}: {}", input.masked(), failure);
            return Verdict::provider_error();
        }
    };

    let line_type = result
        .line_type
        .as_deref()
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let reachability = result
        .reachability
        .as_deref()
        .map(|r| r.trim().to_ascii_lowercase())
        .filter(|r| !r.is_empty());
    let country_code = result.country_code.clone();

    let reason = decide(input, &line_type, reachability.as_deref(), country_code.as_deref(), policy);

    tracing::debug!(
        "Classified {}: type={}, country={:?}, reachability={:?} -> {}",
        input.masked(),
        line_type,
        country_code,
        reachability,
        reason
    );

    Verdict::new(reason, line_type, country_code, reachability)
}

fn decide(
    input: &PhoneInput,
    line_type: &str,
    reachability: Option<&str>,
    country_code: Option<&str>,
    policy: &ClassifierPolicy,
) -> ReasonCode {
    if let (CountryRestriction::Only(expected), Some(country)) = (&policy.country, country_code) {
        if !country.trim().eq_ignore_ascii_case(expected) {
            return ReasonCode::NonUs;
        }
    }

    if reachability == Some("unreachable") {
        return ReasonCode::Unreachable;
    }

    let is_voip = VOIP_LINE_TYPES.contains(&line_type);
    if is_voip {
        let active = reachability.is_some_and(|r| ACTIVE_STATUSES.contains(&r));
        match policy.voip {
            VoipPolicy::Block => return ReasonCode::Voip,
            VoipPolicy::AllowIfActive if !active => return ReasonCode::Voip,
            VoipPolicy::AllowIfActive | VoipPolicy::Allow => {}
        }
    }

    let is_toll_free = TOLL_FREE_LINE_TYPES.contains(&line_type)
        || TOLL_FREE_AREA_CODES.contains(&input.area_code());
    if is_toll_free && policy.toll_free == TollFreePolicy::Block {
        return ReasonCode::TollFree;
    }

    let recognized = is_voip || is_toll_free || KNOWN_LINE_TYPES.contains(&line_type);
    if !recognized && policy.unknown_type == UnknownTypePolicy::Reject {
        return ReasonCode::UnknownType;
    }

    ReasonCode::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;

    fn lookup(country: Option<&str>, line_type: Option<&str>, reach: Option<&str>) -> Result<LookupResult, LookupFailure> {
        Ok(LookupResult {
            country_code: country.map(String::from),
            line_type: line_type.map(String::from),
            reachability: reach.map(String::from),
        })
    }

    fn phone() -> PhoneInput {
        normalize("415-555-2671").unwrap()
    }

    #[test]
    fn test_mobile_reachable_us_is_ok() {
        let verdict = classify(
            &phone(),
            &lookup(Some("US"), Some("mobile"), Some("reachable")),
            &ClassifierPolicy::default(),
        );
        assert!(verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::Ok);
        assert_eq!(verdict.line_type, "mobile");
        assert_eq!(verdict.country_code.as_deref(), Some("US"));
        assert_eq!(verdict.reachability.as_deref(), Some("reachable"));
        assert_eq!(verdict.message, ReasonCode::Ok.message());
    }

    #[test]
    fn test_provider_failure_is_error() {
        let verdict = classify(&phone(), &Err(LookupFailure::Timeout), &ClassifierPolicy::default());
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::Error);
        assert_eq!(verdict.line_type, "unknown");
        assert_eq!(verdict.country_code, None);
    }

    #[test]
    fn test_non_us_wins_over_line_type() {
        for line_type in ["mobile", "landline", "voip", "unknown"] {
            let verdict = classify(
                &phone(),
                &lookup(Some("CA"), Some(line_type), Some("reachable")),
                &ClassifierPolicy::default(),
            );
            assert!(!verdict.valid);
            assert_eq!(verdict.reason, ReasonCode::NonUs);
        }
    }

    #[test]
    fn test_configured_country_rejects_us() {
        let policy = ClassifierPolicy {
            country: CountryRestriction::Only("CA".to_string()),
            ..ClassifierPolicy::default()
        };

        let verdict = classify(&phone(), &lookup(Some("US"), Some("mobile"), Some("reachable")), &policy);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::NonUs);
        assert!(!verdict.message.contains("US"));

        let verdict = classify(&phone(), &lookup(Some("CA"), Some("mobile"), Some("reachable")), &policy);
        assert!(verdict.valid);
    }

    #[test]
    fn test_country_compare_is_case_insensitive() {
        let verdict = classify(
            &phone(),
            &lookup(Some("us"), Some("mobile"), None),
            &ClassifierPolicy::default(),
        );
        assert!(verdict.valid);
    }

    #[test]
    fn test_absent_country_does_not_fail() {
        let verdict = classify(
            &phone(),
            &lookup(None, Some("landline"), None),
            &ClassifierPolicy::default(),
        );
        assert!(verdict.valid);
        assert_eq!(verdict.country_code, None);
    }

    #[test]
    fn test_any_country() {
        let policy = ClassifierPolicy {
            country: CountryRestriction::Any,
            ..Default::default()
        };
        let verdict = classify(&phone(), &lookup(Some("GB"), Some("mobile"), None), &policy);
        assert!(verdict.valid);
    }

    #[test]
    fn test_unreachable_mobile() {
        let verdict = classify(
            &phone(),
            &lookup(Some("US"), Some("Mobile"), Some("UNREACHABLE")),
            &ClassifierPolicy::default(),
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::Unreachable);
        assert_eq!(verdict.line_type, "mobile");
        assert_eq!(verdict.reachability.as_deref(), Some("unreachable"));
    }

    #[test]
    fn test_voip_block() {
        let policy = ClassifierPolicy::default();
        for reach in [None, Some("active"), Some("reachable")] {
            let verdict = classify(&phone(), &lookup(Some("US"), Some("voip"), reach), &policy);
            assert!(!verdict.valid);
            assert_eq!(verdict.reason, ReasonCode::Voip);
        }
        let verdict = classify(&phone(), &lookup(Some("US"), Some("nonFixedVoip"), None), &policy);
        assert_eq!(verdict.reason, ReasonCode::Voip);
        assert_eq!(verdict.line_type, "nonfixedvoip");
    }

    #[test]
    fn test_voip_allow() {
        let policy = ClassifierPolicy {
            voip: VoipPolicy::Allow,
            ..Default::default()
        };
        let verdict = classify(&phone(), &lookup(Some("US"), Some("VOIP"), None), &policy);
        assert!(verdict.valid);
        assert_eq!(verdict.line_type, "voip");
    }

    #[test]
    fn test_voip_allow_if_active() {
        let policy = ClassifierPolicy {
            voip: VoipPolicy::AllowIfActive,
            ..Default::default()
        };
        let active = classify(&phone(), &lookup(Some("US"), Some("voip"), Some("active")), &policy);
        assert!(active.valid);
        let reachable = classify(&phone(), &lookup(Some("US"), Some("voip"), Some("Reachable")), &policy);
        assert!(reachable.valid);

        let missing = classify(&phone(), &lookup(Some("US"), Some("voip"), None), &policy);
        assert!(!missing.valid);
        assert_eq!(missing.reason, ReasonCode::Voip);
        let inactive = classify(&phone(), &lookup(Some("US"), Some("voip"), Some("inactive")), &policy);
        assert!(!inactive.valid);
    }

    #[test]
    fn test_toll_free_area_code() {
        let input = normalize("(800) 555-2671").unwrap();
        let verdict = classify(
            &input,
            &lookup(Some("US"), Some("landline"), None),
            &ClassifierPolicy::default(),
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::TollFree);
    }

    #[test]
    fn test_toll_free_line_type() {
        let verdict = classify(
            &phone(),
            &lookup(Some("US"), Some("tollFree"), None),
            &ClassifierPolicy::default(),
        );
        assert_eq!(verdict.reason, ReasonCode::TollFree);
    }

    #[test]
    fn test_toll_free_allowed() {
        let policy = ClassifierPolicy {
            toll_free: TollFreePolicy::Allow,
            ..Default::default()
        };
        let input = normalize("888-555-2671").unwrap();
        let verdict = classify(&input, &lookup(Some("US"), Some("tollFree"), None), &policy);
        assert!(verdict.valid);
    }

    #[test]
    fn test_unknown_type_policy() {
        let strict = ClassifierPolicy::default();
        let verdict = classify(&phone(), &lookup(Some("US"), None, Some("reachable")), &strict);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::UnknownType);
        assert_eq!(verdict.line_type, "unknown");

        let pager = classify(&phone(), &lookup(Some("US"), Some("pager"), None), &strict);
        assert_eq!(pager.reason, ReasonCode::UnknownType);

        let lenient = ClassifierPolicy {
            unknown_type: UnknownTypePolicy::Accept,
            ..Default::default()
        };
        let verdict = classify(&phone(), &lookup(Some("US"), Some("unknown"), None), &lenient);
        assert!(verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::Ok);
    }

    #[test]
    fn test_rejected_verdict() {
        let verdict = Verdict::rejected(RejectReason::FakePattern);
        assert!(!verdict.valid);
        assert_eq!(verdict.reason, ReasonCode::FakePattern);
        assert_eq!(verdict.line_type, "unknown");
        assert_eq!(verdict.reachability, None);
    }

    #[test]
    fn test_verdict_json_shape() {
        let verdict = classify(
            &phone(),
            &lookup(Some("US"), Some("mobile"), Some("reachable")),
            &ClassifierPolicy::default(),
        );
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["type"], "mobile");
        assert_eq!(json["countryCode"], "US");
        assert_eq!(json["reachability"], "reachable");
        assert_eq!(json["reason"], "ok");
        assert!(json["message"].is_string());

        let rejected = serde_json::to_value(Verdict::rejected(RejectReason::BadLength)).unwrap();
        assert_eq!(rejected["reason"], "bad-length");
        assert!(rejected["countryCode"].is_null());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("block".parse::<VoipPolicy>().unwrap(), VoipPolicy::Block);
        assert_eq!("Allow-If-Active".parse::<VoipPolicy>().unwrap(), VoipPolicy::AllowIfActive);
        assert!("maybe".parse::<VoipPolicy>().is_err());
        assert_eq!("accept".parse::<UnknownTypePolicy>().unwrap(), UnknownTypePolicy::Accept);
        assert_eq!("allow".parse::<TollFreePolicy>().unwrap(), TollFreePolicy::Allow);
        assert_eq!("any".parse::<CountryRestriction>().unwrap(), CountryRestriction::Any);
        assert_eq!(
            "ca".parse::<CountryRestriction>().unwrap(),
            CountryRestriction::Only("CA".to_string())
        );
        assert!("USA".parse::<CountryRestriction>().is_err());
    }
}
