//! # apple-signin-account
//!
//! Apple Sign In account plugin: credential records, the token lifecycle
//! decider, and the provider-facing collaborators.
//!
//! This crate provides:
//! - The persisted credential record and its lossless JSON form
//! - The token lifecycle decision logic (exchange vs. revalidate vs. nothing)
//! - The two-step decide/execute generation protocol with a single-use
//!   pending action
//! - A client for Apple's token endpoint, authenticating with freshly
//!   signed ES256 client secrets
//! - Verification of Apple's server-to-server notification JWTs
//!
//! ## Overview
//!
//! Apple's constraints drive the design: an authorization code can be
//! exchanged exactly once, and a refresh token can be revalidated at most
//! once per day. The decision logic therefore compares the inbound request's
//! credential record against the previously persisted one, and only
//! contacts Apple when the result can be saved.
//!
//! HTTP routing, request plumbing, and the storage mechanism belong to the
//! host framework; this crate consumes them through the
//! [`AccountDelegate`] and [`TokenExchanger`] interfaces.
//!
//! ## Modules
//!
//! - [`account`] - In-memory account state and the generation protocol
//! - [`clock`] - Injectable time source
//! - [`client_secret`] - ES256 client secret signing
//! - [`config`] - Plugin configuration
//! - [`credentials`] - The persisted credential record
//! - [`error`] - Error types
//! - [`generation`] - The token lifecycle decider
//! - [`notifications`] - Server-to-server notification verification
//! - [`storage`] - Persistence delegate trait
//! - [`token_client`] - Apple token endpoint client

pub mod account;
pub mod client_secret;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod generation;
pub mod notifications;
pub mod storage;
pub mod token_client;

pub use account::AppleAccount;
pub use client_secret::{APPLE_ISSUER, ClientSecretSigner};
pub use clock::{Clock, SystemClock};
pub use config::AppleSignInConfig;
pub use credentials::StoredCredentials;
pub use error::AccountError;
pub use generation::{GenerationAction, StoredLookup, decide};
pub use notifications::{
    APPLE_KEYS_ENDPOINT, AppleSignInClaims, NotificationEvent, NotificationEventType,
    NotificationPayload, NotificationVerifier,
};
pub use storage::AccountDelegate;
pub use token_client::{APPLE_TOKEN_ENDPOINT, AppleTokenClient, TokenExchanger, TokenPair};

/// Type alias for account operation results.
pub type AccountResult<T> = Result<T, AccountError>;
