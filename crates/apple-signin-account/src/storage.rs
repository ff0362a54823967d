//! Persistence delegate trait.
//!
//! The plugin never talks to storage directly. The host hands each account a
//! save capability, and the account pushes its serialized record through it
//! after a successful generation cycle. Whether a delegate is present at all
//! also gates token generation: a fresh refresh token that cannot be saved
//! would be lost, and the authorization code that produced it is single-use.

use async_trait::async_trait;

use crate::AccountResult;
use crate::credentials::StoredCredentials;

/// Save capability for one account's credential record.
///
/// The record replaces the previously stored record in full; there are no
/// partial field updates visible to storage.
///
/// # Example Implementation
///
/// ```ignore
/// use apple_signin_account::{AccountDelegate, AccountResult, StoredCredentials};
///
/// struct InMemoryDelegate {
///     records: tokio::sync::Mutex<std::collections::HashMap<String, String>>,
///     account_id: String,
/// }
///
/// #[async_trait::async_trait]
/// impl AccountDelegate for InMemoryDelegate {
///     async fn save_credentials(&self, credentials: &StoredCredentials) -> AccountResult<()> {
///         let mut records = self.records.lock().await;
///         records.insert(self.account_id.clone(), credentials.to_json()?);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait AccountDelegate: Send + Sync {
    /// Persists the record, replacing any previously stored record for the
    /// account.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    async fn save_credentials(&self, credentials: &StoredCredentials) -> AccountResult<()>;
}
