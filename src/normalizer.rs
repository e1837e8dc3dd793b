//! Local phone number normalization.
//!
//! Turns raw form input into a canonical 10-digit North American number and
//! its E.164 form, rejecting obviously malformed or fabricated numbers before
//! any provider call is spent on them.

use std::fmt;

/// Number of digits in a North American national number.
pub const NATIONAL_LENGTH: usize = 10;

/// Country calling code for the North American Numbering Plan.
pub const NANP_COUNTRY_CODE: &str = "1";

/// A request-scoped, normalized phone number.
///
/// Only [`normalize`] builds one, so `digits` is always 10 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneInput {
    raw: String,
    digits: String,
    e164: String,
}

impl PhoneInput {
    /// The original user-supplied string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `raw` with every non-digit removed.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// International form used as lookup key and OTP destination (`+1XXXXXXXXXX`).
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The three-digit area code.
    pub fn area_code(&self) -> &str {
        self.digits.get(..3).unwrap_or_default()
    }

    /// The seven-digit subscriber number (exchange + line).
    pub fn subscriber(&self) -> &str {
        self.digits.get(3..).unwrap_or_default()
    }

    /// Log-safe rendering that only reveals the last four digits.
    pub fn masked(&self) -> String {
        mask_phone(&self.digits)
    }
}

/// Why a number was rejected locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Digit count after stripping is not exactly 10.
    BadLength,
    /// Subscriber number ends in `0000` or is a single repeated digit.
    FakePattern,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::BadLength => "bad-length",
            RejectReason::FakePattern => "fake-pattern",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::BadLength => write!(f, "phone number must have exactly 10 digits"),
            RejectReason::FakePattern => write!(f, "phone number looks fabricated"),
        }
    }
}

impl std::error::Error for RejectReason {}

/// Normalize a raw phone string.
///
/// Strips every non-digit, enforces the strict 10-digit length, and runs the
/// fabricated-number filter. Pure and total: never panics, never does I/O.
///
/// # Arguments
///
/// * `raw` - User input such as `"(415) 555-2671"`.
///
/// # Returns
///
/// * `Result<PhoneInput, RejectReason>` - The normalized number or the local rejection.
pub fn normalize(raw: &str) -> Result<PhoneInput, RejectReason> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != NATIONAL_LENGTH {
        tracing::debug!(
            "❌ Rejected phone with {} digits (expected {})",
            digits.len(),
            NATIONAL_LENGTH
        );
        return Err(RejectReason::BadLength);
    }

    if is_fake_subscriber(&digits[3..]) {
        tracing::debug!("❌ Rejected fabricated phone: {}", mask_phone(&digits));
        return Err(RejectReason::FakePattern);
    }

    let e164 = format!("+{}{}", NANP_COUNTRY_CODE, digits);

    Ok(PhoneInput {
        raw: raw.to_string(),
        digits,
        e164,
    })
}

/// `xxx-0000` line numbers and `8888888`-style repeats.
fn is_fake_subscriber(subscriber: &str) -> bool {
    if subscriber.ends_with("0000") {
        return true;
    }

    let mut chars = subscriber.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

/// Mask all but the last four digits of a number for logging.
pub fn mask_phone(value: &str) -> String {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let visible: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(digits.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting() {
        let input = normalize("(415) 555-2671").unwrap();
        assert_eq!(input.digits(), "4155552671");
        assert_eq!(input.e164(), "+14155552671");
        assert_eq!(input.raw(), "(415) 555-2671");
        assert_eq!(input.area_code(), "415");
        assert_eq!(input.subscriber(), "5552671");
    }

    #[test]
    fn test_e164_keeps_every_digit() {
        let input = normalize("1115552671").unwrap();
        assert_eq!(input.e164(), "+11115552671");
        assert_eq!(input.area_code(), "111");

        let input = normalize("123-456-7891").unwrap();
        assert_eq!(input.e164(), "+11234567891");

        let input = normalize("(012) 345-6789").unwrap();
        assert_eq!(input.e164(), "+10123456789");
        assert_eq!(input.subscriber(), "3456789");
    }

    #[test]
    fn test_bad_length() {
        assert_eq!(normalize(""), Err(RejectReason::BadLength));
        assert_eq!(normalize("415-555-267"), Err(RejectReason::BadLength));
        // A leading country code is not accepted under the strict policy
        assert_eq!(normalize("+1 415 555 2671"), Err(RejectReason::BadLength));
        assert_eq!(normalize("not a phone"), Err(RejectReason::BadLength));
    }

    #[test]
    fn test_trailing_zeros_are_fake() {
        assert_eq!(normalize("555-123-0000"), Err(RejectReason::FakePattern));
        assert_eq!(normalize("4159870000"), Err(RejectReason::FakePattern));
    }

    #[test]
    fn test_repeated_subscriber_is_fake() {
        assert_eq!(normalize("555-888-8888"), Err(RejectReason::FakePattern));
        assert_eq!(normalize("2121111111"), Err(RejectReason::FakePattern));
    }

    #[test]
    fn test_near_fake_numbers_pass() {
        assert!(normalize("415-555-0001").is_ok());
        assert!(normalize("415-888-8887").is_ok());
        assert!(normalize("4150000123").is_ok());
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(RejectReason::BadLength.code(), "bad-length");
        assert_eq!(RejectReason::FakePattern.code(), "fake-pattern");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("4155552671"), "******2671");
        assert_eq!(mask_phone("+1 (415) 555-2671"), "*******2671");
        assert_eq!(mask_phone("12"), "**");
    }
}
