//! Token lifecycle decision logic.
//!
//! One authentication attempt produces two credential records: the one built
//! from the inbound request and the one previously persisted for the
//! account. [`decide`] compares the two and picks exactly one
//! [`GenerationAction`]; the account then executes that action against
//! Apple's token endpoint.
//!
//! Ordering matters. A fresh authorization code yields a refresh token that
//! has never been validated, so the exchange path takes priority and the
//! staleness check never fires in the same cycle as an exchange.

use time::{Duration, OffsetDateTime};

use crate::account::AppleAccount;
use crate::credentials::StoredCredentials;

/// The provider call required to bring an account's tokens up to date.
///
/// An action is produced by one decision step and consumed by exactly one
/// execution step; it is never reused across decision cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationAction {
    /// Nothing to do.
    NoGeneration,

    /// Exchange the authorization code for a fresh token pair.
    ExchangeAuthorizationCode {
        /// The single-use code presented by the client.
        code: String,
    },

    /// Confirm with Apple that the refresh token is still valid.
    RevalidateRefreshToken {
        /// The refresh token to revalidate.
        token: String,
    },
}

impl GenerationAction {
    /// Apple rejects refresh token validation more than once per day.
    pub const MINIMUM_VALIDATION_INTERVAL: Duration = Duration::hours(24);

    /// Returns `true` if this action requires a provider call.
    #[must_use]
    pub fn requires_generation(&self) -> bool {
        !matches!(self, Self::NoGeneration)
    }
}

/// Outcome of loading the previously persisted record for an account.
#[derive(Debug, Clone, Copy)]
pub enum StoredLookup<'a> {
    /// No record was persisted for this account.
    Missing,

    /// A record exists but is not an Apple Sign In record. The decider never
    /// generates tokens against a record of unknown shape.
    ForeignScheme,

    /// The decoded Apple Sign In record.
    Found(&'a StoredCredentials),
}

impl<'a> From<Option<&'a StoredCredentials>> for StoredLookup<'a> {
    fn from(stored: Option<&'a StoredCredentials>) -> Self {
        match stored {
            Some(credentials) => Self::Found(credentials),
            None => Self::Missing,
        }
    }
}

/// Decides which generation step the account needs.
///
/// The algorithm is ordered and the first match wins:
///
/// 1. The request carries an authorization code that the stored record does
///    not already hold: exchange it. An identical stored code means the code
///    was already exchanged, and a consumed code must never be exchanged
///    again, so the decision falls through to the staleness check.
/// 2. Take the most authoritative `(last_validation, refresh_token)` pair:
///    the stored record's pair when it supplies both, otherwise the request
///    record's own pair. No pair means there is nothing to do.
/// 3. Revalidate when the pair is at least
///    [`GenerationAction::MINIMUM_VALIDATION_INTERVAL`] old.
///
/// This function never fails; a foreign-scheme record is treated as no
/// stored record. Preconditions that depend on the account's collaborators
/// (persistence delegate present, foreign-record logging) live in
/// [`AppleAccount::check_token_generation`].
#[must_use]
pub fn decide(
    request: &AppleAccount,
    stored: StoredLookup<'_>,
    now: OffsetDateTime,
) -> GenerationAction {
    let stored = match stored {
        StoredLookup::Found(credentials) => Some(credentials),
        StoredLookup::Missing | StoredLookup::ForeignScheme => None,
    };

    // The tokens on the request record are new; a code we have not seen
    // before must be exchanged before any staleness check has meaning.
    if let Some(code) = request.authorization_code.as_deref() {
        match stored.and_then(|s| s.authorization_code.as_deref()) {
            Some(stored_code) if stored_code == code => {
                // Replay of an already-consumed code. Assumed tolerable by
                // the provider as long as we do not exchange it again.
            }
            _ => {
                return GenerationAction::ExchangeAuthorizationCode {
                    code: code.to_owned(),
                };
            }
        }
    }

    let pair = stored
        .and_then(StoredCredentials::validation_pair)
        .map(|(validated_at, token)| (validated_at, token.to_owned()))
        .or_else(|| request.validation_pair());

    match pair {
        Some((validated_at, token))
            if now - validated_at >= GenerationAction::MINIMUM_VALIDATION_INTERVAL =>
        {
            GenerationAction::RevalidateRefreshToken { token }
        }
        _ => GenerationAction::NoGeneration,
    }
}
