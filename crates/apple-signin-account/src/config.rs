//! Apple Sign In configuration.
//!
//! # Example
//!
//! ```ignore
//! use apple_signin_account::AppleSignInConfig;
//!
//! let config = AppleSignInConfig::new(
//!     "com.example.myapp",
//!     "TEAM123456",
//!     "KEY1234567",
//!     private_key_pem,
//! )
//! .with_redirect_uri("https://my-app.example.com/auth/apple");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_client_secret_lifetime() -> Duration {
    Duration::from_secs(3600)
}

/// Configuration for the Apple Sign In account plugin.
///
/// The `team_id`, `key_id`, and `private_key` come from the key created on
/// the Apple developer site for server-to-server calls. The key is a `.p8`
/// PEM; to embed it in single-line JSON use:
///
/// ```text
/// awk 'NF {sub(/\r/, ""); printf "%s\\n",$0;}' AuthKey_KEY1234567.p8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppleSignInConfig {
    /// The reverse DNS style identifier of the client app. Used as the
    /// client secret `sub` claim and as the expected notification audience.
    pub client_id: String,

    /// Apple developer team identifier. Used as the client secret `iss`
    /// claim.
    pub team_id: String,

    /// Identifier of the signing key, sent as the client secret `kid`
    /// header.
    pub key_id: String,

    /// PEM contents of the `.p8` signing key.
    pub private_key: String,

    /// Redirect URI registered with the Service Id. Only needed for the web
    /// flow; native app flows omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Optional override for Apple's token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// Optional override for Apple's public key (JWKS) endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys_endpoint: Option<String>,

    /// HTTP request timeout (default: 30 seconds).
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Lifetime of generated client secrets (default: 1 hour; Apple accepts
    /// up to six months).
    #[serde(default = "default_client_secret_lifetime", with = "humantime_serde")]
    pub client_secret_lifetime: Duration,

    /// Whether to allow HTTP (non-HTTPS) endpoint overrides.
    /// This should only be enabled for testing.
    #[serde(default)]
    pub allow_http: bool,
}

impl AppleSignInConfig {
    /// Creates a new configuration with the required fields.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        team_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            team_id: team_id.into(),
            key_id: key_id.into(),
            private_key: private_key.into(),
            redirect_uri: None,
            token_endpoint: None,
            keys_endpoint: None,
            request_timeout: default_request_timeout(),
            client_secret_lifetime: default_client_secret_lifetime(),
            allow_http: false,
        }
    }

    /// Sets the redirect URI for the web flow.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Sets the token endpoint override.
    #[must_use]
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the public key endpoint override.
    #[must_use]
    pub fn with_keys_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.keys_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the lifetime of generated client secrets.
    #[must_use]
    pub fn with_client_secret_lifetime(mut self, lifetime: Duration) -> Self {
        self.client_secret_lifetime = lifetime;
        self
    }

    /// Allows HTTP (non-HTTPS) endpoint overrides.
    ///
    /// # Warning
    ///
    /// This should only be used for testing.
    #[must_use]
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AppleSignInConfig::new("com.example.app", "TEAM123456", "KEY1234567", "PEM")
            .with_redirect_uri("https://app.example.com/auth/apple")
            .with_request_timeout(Duration::from_secs(10))
            .with_client_secret_lifetime(Duration::from_secs(300));

        assert_eq!(config.client_id, "com.example.app");
        assert_eq!(config.team_id, "TEAM123456");
        assert_eq!(config.key_id, "KEY1234567");
        assert_eq!(
            config.redirect_uri,
            Some("https://app.example.com/auth/apple".to_string())
        );
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.client_secret_lifetime, Duration::from_secs(300));
        assert!(!config.allow_http);
        assert!(config.token_endpoint.is_none());
        assert!(config.keys_endpoint.is_none());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let json = r#"{
            "client_id": "com.example.app",
            "team_id": "TEAM123456",
            "key_id": "KEY1234567",
            "private_key": "PEM"
        }"#;

        let config: AppleSignInConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.client_secret_lifetime, Duration::from_secs(3600));
        assert!(!config.allow_http);
        assert!(config.redirect_uri.is_none());
    }

    #[test]
    fn test_config_serialization_skips_absent_overrides() {
        let config = AppleSignInConfig::new("com.example.app", "TEAM123456", "KEY1234567", "PEM");
        let json = serde_json::to_string(&config).unwrap();

        assert!(!json.contains("token_endpoint"));
        assert!(!json.contains("keys_endpoint"));
        assert!(!json.contains("redirect_uri"));

        let deserialized: AppleSignInConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.client_id, config.client_id);
        assert_eq!(deserialized.request_timeout, config.request_timeout);
    }
}
