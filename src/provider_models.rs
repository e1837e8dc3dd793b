//! Wire models for the telecom-intelligence provider's Lookup and Verify APIs.
//!
//! Only the fields this service reads are modelled; everything else in the
//! provider payloads is ignored.

use crate::classifier::LookupResult;
use serde::Deserialize;

/// Body of `GET /v2/PhoneNumbers/{number}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    pub country_code: Option<String>,
    pub line_type_intelligence: Option<LineTypeIntelligence>,
    pub line_status: Option<LineStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineTypeIntelligence {
    #[serde(rename = "type")]
    pub line_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineStatus {
    pub status: Option<String>,
}

impl From<LookupResponse> for LookupResult {
    fn from(response: LookupResponse) -> Self {
        LookupResult {
            country_code: response.country_code,
            line_type: response.line_type_intelligence.and_then(|l| l.line_type),
            reachability: response.line_status.and_then(|s| s.status),
        }
    }
}

/// Body of the Verify `Verifications` and `VerificationCheck` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_response_maps_to_result() {
        let body = serde_json::json!({
            "calling_country_code": "1",
            "country_code": "US",
            "phone_number": "+14155552671",
            "national_format": "(415) 555-2671",
            "valid": true,
            "line_type_intelligence": {
                "carrier_name": "T-Mobile USA, Inc.",
                "error_code": null,
                "mobile_country_code": "310",
                "mobile_network_code": "160",
                "type": "mobile"
            },
            "line_status": { "status": "active", "error_code": null },
            "url": "https://lookups.twilio.com/v2/PhoneNumbers/+14155552671"
        });

        let response: LookupResponse = serde_json::from_value(body).unwrap();
        let result = LookupResult::from(response);
        assert_eq!(result.country_code.as_deref(), Some("US"));
        assert_eq!(result.line_type.as_deref(), Some("mobile"));
        assert_eq!(result.reachability.as_deref(), Some("active"));
    }

    #[test]
    fn test_lookup_response_without_packages() {
        let body = serde_json::json!({
            "country_code": null,
            "phone_number": "+14155552671",
            "valid": false,
            "line_type_intelligence": null
        });

        let response: LookupResponse = serde_json::from_value(body).unwrap();
        let result = LookupResult::from(response);
        assert_eq!(result, LookupResult::default());
    }
}
