//! Account error types.
//!
//! This module defines all error types that can occur while managing Apple
//! Sign In credentials: decoding persisted records, running the token
//! lifecycle protocol, calling Apple's endpoints, and verifying notification
//! tokens.

/// Errors that can occur during Apple Sign In account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// A persisted credential record could not be decoded.
    ///
    /// Callers should treat this as "no prior record" so that account
    /// creation can proceed for brand-new accounts.
    #[error("Failed to decode stored credentials: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// A credential record could not be encoded for storage.
    #[error("Failed to encode credentials for storage: {message}")]
    Encode {
        /// Description of the encode failure.
        message: String,
    },

    /// The execution step was invoked without a preceding decision step.
    #[error("No pending generation action: call check_token_generation first")]
    NoPendingAction,

    /// A stored record decoded, but it belongs to a different account scheme.
    #[error("Stored credentials do not belong to the Apple Sign In scheme")]
    MisconfiguredRecord,

    /// The record has no id token yet and cannot be persisted.
    #[error("Credentials are missing an id token")]
    MissingIdToken,

    /// A call to Apple's token endpoint failed.
    #[error("Provider call failed: {message}")]
    ProviderCall {
        /// Description of the failure, including Apple's OAuth error code
        /// when one was returned.
        message: String,
    },

    /// The client secret could not be created or signed.
    #[error("Client secret signing failed: {message}")]
    ClientSecret {
        /// Description of the signing failure.
        message: String,
    },

    /// The plugin configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// A notification token or payload failed verification.
    #[error("Notification verification failed: {message}")]
    Verification {
        /// Description of the verification failure.
        message: String,
    },

    /// The notification token is missing the `kid` header.
    #[error("Notification token is missing key ID (kid) header")]
    MissingKeyId,

    /// No key matching the token's `kid` was found in Apple's key set.
    #[error("Key not found in Apple's key set: {kid}")]
    KeyNotFound {
        /// The key ID that could not be resolved.
        kid: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT decoding or validation error.
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AccountError {
    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a new `Encode` error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a new `ProviderCall` error.
    #[must_use]
    pub fn provider_call(message: impl Into<String>) -> Self {
        Self::ProviderCall {
            message: message.into(),
        }
    }

    /// Creates a new `ClientSecret` error.
    #[must_use]
    pub fn client_secret(message: impl Into<String>) -> Self {
        Self::ClientSecret {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Verification` error.
    #[must_use]
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }

    /// Creates a new `KeyNotFound` error.
    #[must_use]
    pub fn key_not_found(kid: impl Into<String>) -> Self {
        Self::KeyNotFound { kid: kid.into() }
    }

    /// Returns `true` if this error means the stored record is unusable
    /// rather than the operation having failed.
    #[must_use]
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::MisconfiguredRecord | Self::MissingIdToken
        )
    }

    /// Returns `true` if this error came from a provider call (network or
    /// Apple's token endpoint).
    #[must_use]
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::ProviderCall { .. } | Self::Network(_))
    }

    /// Returns `true` if this error came from verifying a notification token.
    #[must_use]
    pub fn is_verification_error(&self) -> bool {
        matches!(
            self,
            Self::Verification { .. } | Self::MissingKeyId | Self::KeyNotFound { .. } | Self::Jwt(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AccountError::decode("unexpected end of input");
        assert_eq!(
            err.to_string(),
            "Failed to decode stored credentials: unexpected end of input"
        );

        let err = AccountError::NoPendingAction;
        assert_eq!(
            err.to_string(),
            "No pending generation action: call check_token_generation first"
        );

        let err = AccountError::provider_call("invalid_grant - code already used");
        assert_eq!(
            err.to_string(),
            "Provider call failed: invalid_grant - code already used"
        );

        let err = AccountError::key_not_found("AIDOPK1");
        assert_eq!(err.to_string(), "Key not found in Apple's key set: AIDOPK1");
    }

    #[test]
    fn test_error_predicates() {
        assert!(AccountError::decode("bad json").is_record_error());
        assert!(AccountError::MisconfiguredRecord.is_record_error());
        assert!(AccountError::MissingIdToken.is_record_error());
        assert!(!AccountError::NoPendingAction.is_record_error());

        assert!(AccountError::provider_call("500").is_provider_error());
        assert!(!AccountError::provider_call("500").is_record_error());

        assert!(AccountError::MissingKeyId.is_verification_error());
        assert!(AccountError::key_not_found("kid-1").is_verification_error());
        assert!(AccountError::verification("bad audience").is_verification_error());
        assert!(!AccountError::verification("bad audience").is_provider_error());
    }
}
