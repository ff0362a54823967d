//! Persisted credential record.
//!
//! [`StoredCredentials`] is the serialized form of one account's Apple Sign
//! In token state. It round-trips losslessly through JSON, including the
//! absence of optional fields, so that a record written by one server
//! version can be read back by another.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AccountResult;
use crate::error::AccountError;

/// Token state persisted for one account.
///
/// The authorization code is stored alongside the tokens so that a code
/// which was already exchanged is never exchanged again; Apple rejects
/// reuse of a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// The most recently exchanged authorization code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,

    /// Apple's identity token for the signed-in user.
    pub id_token: String,

    /// Long-lived token obtained by exchanging an authorization code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Last time the refresh token was successfully revalidated with Apple.
    /// Apple limits revalidation to at most once per day.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_validation: Option<OffsetDateTime>,
}

impl StoredCredentials {
    /// Creates a record holding only an id token.
    #[must_use]
    pub fn new(id_token: impl Into<String>) -> Self {
        Self {
            authorization_code: None,
            id_token: id_token.into(),
            refresh_token: None,
            last_validation: None,
        }
    }

    /// Decodes a record from its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Decode`] when the payload is malformed or
    /// incompatible. Callers should treat that as "no prior record" so that
    /// account creation can proceed for brand-new accounts.
    pub fn from_json(json: &str) -> AccountResult<Self> {
        serde_json::from_str(json).map_err(|e| AccountError::decode(e.to_string()))
    }

    /// Encodes the record to its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Encode`] when serialization fails.
    pub fn to_json(&self) -> AccountResult<String> {
        serde_json::to_string(self).map_err(|e| AccountError::encode(e.to_string()))
    }

    /// Returns the `(last_validation, refresh_token)` pair when the record
    /// carries both.
    #[must_use]
    pub fn validation_pair(&self) -> Option<(OffsetDateTime, &str)> {
        match (self.last_validation, self.refresh_token.as_deref()) {
            (Some(validated_at), Some(token)) => Some((validated_at, token)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_round_trip_full_record() {
        let record = StoredCredentials {
            authorization_code: Some("c_abc123".to_string()),
            id_token: "eyJ.id.token".to_string(),
            refresh_token: Some("r_def456".to_string()),
            last_validation: Some(datetime!(2024-05-01 12:30:00 UTC)),
        };

        let json = record.to_json().unwrap();
        let decoded = StoredCredentials::from_json(&json).unwrap();

        assert_eq!(decoded, record);
    }

    #[test]
    fn test_round_trip_preserves_absence() {
        let record = StoredCredentials::new("eyJ.id.token");

        let json = record.to_json().unwrap();

        // Absent fields are omitted entirely, not encoded as empty strings.
        assert!(!json.contains("authorization_code"));
        assert!(!json.contains("refresh_token"));
        assert!(!json.contains("last_validation"));

        let decoded = StoredCredentials::from_json(&json).unwrap();
        assert_eq!(decoded, record);
        assert!(decoded.authorization_code.is_none());
        assert!(decoded.refresh_token.is_none());
        assert!(decoded.last_validation.is_none());
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let record = StoredCredentials {
            authorization_code: None,
            id_token: "t".to_string(),
            refresh_token: Some("r".to_string()),
            last_validation: Some(datetime!(2024-05-01 12:30:00 UTC)),
        };

        let json = record.to_json().unwrap();
        assert!(json.contains("2024-05-01T12:30:00Z"));
    }

    #[test]
    fn test_decode_malformed_payload() {
        let err = StoredCredentials::from_json("not json").unwrap_err();
        assert!(matches!(err, AccountError::Decode { .. }));

        // Missing the required id_token field.
        let err = StoredCredentials::from_json(r#"{"refresh_token":"r"}"#).unwrap_err();
        assert!(matches!(err, AccountError::Decode { .. }));
    }

    #[test]
    fn test_validation_pair_requires_both_fields() {
        let mut record = StoredCredentials::new("t");
        assert!(record.validation_pair().is_none());

        record.refresh_token = Some("r".to_string());
        assert!(record.validation_pair().is_none());

        record.last_validation = Some(datetime!(2024-05-01 12:30:00 UTC));
        let (validated_at, token) = record.validation_pair().unwrap();
        assert_eq!(validated_at, datetime!(2024-05-01 12:30:00 UTC));
        assert_eq!(token, "r");
    }
}
