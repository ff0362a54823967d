//! In-memory Apple Sign In account state and the two-step generation
//! protocol.
//!
//! # Overview
//!
//! One authentication attempt handles an account in a single sequential
//! flow:
//!
//! 1. Build an [`AppleAccount`] from the inbound request's raw token
//!    material ([`AppleAccount::from_request`]).
//! 2. Load the previously persisted record, if any, and call
//!    [`AppleAccount::check_token_generation`]. This decides which provider
//!    call is required and parks the decision as the pending action.
//! 3. Call [`AppleAccount::generate_tokens`], which consumes the pending
//!    action exactly once and executes it against Apple's token endpoint.
//! 4. Merge and persist the updated record ([`AppleAccount::save`]).
//!
//! The decision step never fails. Execution-phase errors surface to the
//! caller, who decides whether the authentication attempt as a whole fails;
//! there are no internal retries, and credential fields only change on the
//! success branch of a provider call.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::AccountResult;
use crate::clock::{Clock, SystemClock};
use crate::credentials::StoredCredentials;
use crate::error::AccountError;
use crate::generation::{self, GenerationAction, StoredLookup};
use crate::storage::AccountDelegate;
use crate::token_client::TokenExchanger;

/// Token state for one Apple Sign In account within one request's handling.
///
/// The credential fields mirror [`StoredCredentials`], except that the id
/// token may still be absent while the record is being assembled. Concurrent
/// requests for the same account must be serialized by the host; this type
/// performs no locking of its own.
pub struct AppleAccount {
    /// Single-use code presented by the client, if the request carried one.
    pub authorization_code: Option<String>,

    /// Apple's identity token for the signed-in user.
    pub id_token: Option<String>,

    /// Long-lived token obtained by exchanging an authorization code.
    pub refresh_token: Option<String>,

    /// Last time the refresh token was successfully revalidated.
    pub last_validation: Option<OffsetDateTime>,

    exchanger: Arc<dyn TokenExchanger>,
    delegate: Option<Arc<dyn AccountDelegate>>,
    clock: Arc<dyn Clock>,
    pending: Option<GenerationAction>,
}

impl AppleAccount {
    /// Creates an empty account bound to its collaborators.
    #[must_use]
    pub fn new(
        exchanger: Arc<dyn TokenExchanger>,
        delegate: Option<Arc<dyn AccountDelegate>>,
    ) -> Self {
        Self {
            authorization_code: None,
            id_token: None,
            refresh_token: None,
            last_validation: None,
            exchanger,
            delegate,
            clock: Arc::new(SystemClock),
            pending: None,
        }
    }

    /// Builds the account from the raw token material of an inbound request.
    #[must_use]
    pub fn from_request(
        authorization_code: Option<String>,
        id_token: Option<String>,
        exchanger: Arc<dyn TokenExchanger>,
        delegate: Option<Arc<dyn AccountDelegate>>,
    ) -> Self {
        let mut account = Self::new(exchanger, delegate);
        account.authorization_code = authorization_code;
        account.id_token = id_token;
        account
    }

    /// Builds the account from a decoded persisted record.
    #[must_use]
    pub fn from_stored(
        stored: StoredCredentials,
        exchanger: Arc<dyn TokenExchanger>,
        delegate: Option<Arc<dyn AccountDelegate>>,
    ) -> Self {
        let mut account = Self::new(exchanger, delegate);
        account.authorization_code = stored.authorization_code;
        account.id_token = Some(stored.id_token);
        account.refresh_token = stored.refresh_token;
        account.last_validation = stored.last_validation;
        account
    }

    /// Builds the account from the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Decode`] when the payload is malformed;
    /// callers should treat that as "no prior record".
    pub fn from_json(
        json: &str,
        exchanger: Arc<dyn TokenExchanger>,
        delegate: Option<Arc<dyn AccountDelegate>>,
    ) -> AccountResult<Self> {
        let stored = StoredCredentials::from_json(json)?;
        Ok(Self::from_stored(stored, exchanger, delegate))
    }

    /// Replaces the time source. Tests inject a fixed clock here.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the `(last_validation, refresh_token)` pair when this record
    /// carries both.
    #[must_use]
    pub fn validation_pair(&self) -> Option<(OffsetDateTime, String)> {
        match (self.last_validation, self.refresh_token.as_ref()) {
            (Some(validated_at), Some(token)) => Some((validated_at, token.clone())),
            _ => None,
        }
    }

    /// Overrides this record's credential fields with the newer record's
    /// non-absent fields. Fields absent on the newer record are left
    /// untouched. Never fails and has no other side effects.
    pub fn merge(&mut self, newer: &AppleAccount) {
        if let Some(refresh_token) = &newer.refresh_token {
            self.refresh_token = Some(refresh_token.clone());
        }

        if let Some(id_token) = &newer.id_token {
            self.id_token = Some(id_token.clone());
        }

        if let Some(authorization_code) = &newer.authorization_code {
            self.authorization_code = Some(authorization_code.clone());
        }

        if let Some(last_validation) = newer.last_validation {
            self.last_validation = Some(last_validation);
        }
    }

    /// Converts to the persisted record form.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::MissingIdToken`] while the record has no id
    /// token and is not yet usable.
    pub fn to_stored(&self) -> AccountResult<StoredCredentials> {
        let id_token = self
            .id_token
            .clone()
            .ok_or(AccountError::MissingIdToken)?;

        Ok(StoredCredentials {
            authorization_code: self.authorization_code.clone(),
            id_token,
            refresh_token: self.refresh_token.clone(),
            last_validation: self.last_validation,
        })
    }

    /// Encodes the account to its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::MissingIdToken`] when the record is not yet
    /// usable, or [`AccountError::Encode`] when serialization fails.
    pub fn to_json(&self) -> AccountResult<String> {
        self.to_stored()?.to_json()
    }

    /// Decision step: determines whether a provider call is required and
    /// parks the computed [`GenerationAction`] for [`Self::generate_tokens`].
    ///
    /// Returns `true` when a provider call is needed. Always returns rather
    /// than failing:
    ///
    /// - Without a persistence delegate the answer is always `false`. A
    ///   fresh refresh token that cannot be saved would be lost, and Apple
    ///   throttles refresh token validation, so the provider is not
    ///   contacted at all.
    /// - A stored record of a foreign scheme is logged and treated as no
    ///   usable stored record.
    pub fn check_token_generation(&mut self, stored: StoredLookup<'_>) -> bool {
        if self.delegate.is_none() {
            self.pending = Some(GenerationAction::NoGeneration);
            return false;
        }

        if matches!(stored, StoredLookup::ForeignScheme) {
            tracing::error!(
                error = %AccountError::MisconfiguredRecord,
                "skipping token generation"
            );
            self.pending = Some(GenerationAction::NoGeneration);
            return false;
        }

        let now = self.clock.now();
        let action = generation::decide(self, stored, now);
        let needed = action.requires_generation();
        self.pending = Some(action);
        needed
    }

    /// Returns the action parked by the last decision step, if any.
    #[must_use]
    pub fn pending_action(&self) -> Option<&GenerationAction> {
        self.pending.as_ref()
    }

    /// Execution step: consumes the pending action and performs the provider
    /// call it names. Must immediately follow [`Self::check_token_generation`].
    ///
    /// The pending action is cleared whether the provider call succeeds or
    /// fails; an action is consumed exactly once. Credential fields are
    /// updated only on success:
    ///
    /// - a successful exchange populates `id_token` and `refresh_token`
    ///   from Apple's response;
    /// - a successful revalidation stamps `last_validation` with the
    ///   current time.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NoPendingAction`] when no decision step
    /// preceded this call, or the provider error verbatim when the call
    /// fails.
    pub async fn generate_tokens(&mut self) -> AccountResult<()> {
        let action = self.pending.take().ok_or(AccountError::NoPendingAction)?;

        match action {
            GenerationAction::NoGeneration => Ok(()),
            GenerationAction::ExchangeAuthorizationCode { code } => {
                let pair = self.exchanger.exchange(&code).await?;
                self.id_token = Some(pair.id_token);
                self.refresh_token = Some(pair.refresh_token);
                Ok(())
            }
            GenerationAction::RevalidateRefreshToken { token } => {
                self.exchanger.revalidate(&token).await?;
                self.last_validation = Some(self.clock.now());
                Ok(())
            }
        }
    }

    /// Hands the serialized record to the persistence delegate, replacing
    /// the previously stored record in full.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Configuration`] when no delegate is
    /// configured, [`AccountError::MissingIdToken`] when the record is not
    /// yet usable, or the delegate's error.
    pub async fn save(&self) -> AccountResult<()> {
        let delegate = self
            .delegate
            .as_ref()
            .ok_or_else(|| AccountError::configuration("no persistence delegate configured"))?;

        delegate.save_credentials(&self.to_stored()?).await
    }
}
