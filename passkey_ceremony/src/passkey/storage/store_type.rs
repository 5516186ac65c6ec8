use async_trait::async_trait;

use super::errors::StoreError;
use crate::passkey::types::UserPasskeyInfo;

/// Lookups the ceremonies need from the application's user store.
///
/// The ceremonies only read through this trait. Persisting the records they
/// return, and any locking that keeps two concurrent assertions from both
/// passing the sign-count check, is the implementor's job.
#[async_trait]
pub trait PasskeyUserStore: Send + Sync {
    type User: Clone + Send + Sync;

    /// Any user already owning `credential_id`. Used to keep credential ids
    /// globally unique.
    async fn find_user_by_credential_id(
        &self,
        credential_id: &[u8],
    ) -> Result<Option<Self::User>, StoreError>;

    /// The passkey `credential_id` registered to `user`, if it belongs to them.
    async fn get_stored_passkey(
        &self,
        user: &Self::User,
        credential_id: &[u8],
    ) -> Result<Option<UserPasskeyInfo>, StoreError>;

    /// Resolves a WebAuthn user handle to a user.
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<Self::User>, StoreError>;

    /// The user handle registered with the authenticator for `user`.
    async fn get_user_id(&self, user: &Self::User) -> Result<String, StoreError>;
}
