use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::errors::StoreError;
use super::store_type::PasskeyUserStore;
use crate::passkey::types::UserPasskeyInfo;

/// A user as the in-memory store knows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryUser {
    /// WebAuthn user handle
    pub id: String,
    pub name: String,
}

impl MemoryUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, MemoryUser>,
    /// credential id -> (owning user id, record)
    passkeys: HashMap<Vec<u8>, (String, UserPasskeyInfo)>,
}

/// [`PasskeyUserStore`] over process memory.
///
/// Useful for tests and as a reference for real implementations.
#[derive(Default)]
pub struct MemoryPasskeyStore {
    state: Mutex<MemoryState>,
}

impl MemoryPasskeyStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory passkey store");
        Self::default()
    }

    pub async fn add_user(&self, user: MemoryUser) {
        let mut state = self.state.lock().await;
        state.users.insert(user.id.clone(), user);
    }

    /// Registers `passkey` to the user with id `user_id`.
    ///
    /// Fails if the user is unknown or the credential id is already taken.
    pub async fn add_passkey(
        &self,
        user_id: &str,
        passkey: UserPasskeyInfo,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(user_id) {
            return Err(StoreError::NotFound(format!("user '{user_id}'")));
        }
        if state.passkeys.contains_key(&passkey.credential_id) {
            return Err(StoreError::Conflict(
                "credential id is already registered".to_string(),
            ));
        }
        state
            .passkeys
            .insert(passkey.credential_id.clone(), (user_id.to_string(), passkey));
        Ok(())
    }

    /// Replaces the stored record with the same credential id.
    pub async fn update_passkey(&self, passkey: UserPasskeyInfo) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        match state.passkeys.get_mut(&passkey.credential_id) {
            Some((_, stored)) => {
                *stored = passkey;
                Ok(())
            }
            None => Err(StoreError::NotFound("passkey".to_string())),
        }
    }

    /// All passkeys owned by `user_id`.
    pub async fn passkeys_for(&self, user_id: &str) -> Vec<UserPasskeyInfo> {
        let state = self.state.lock().await;
        state
            .passkeys
            .values()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, passkey)| passkey.clone())
            .collect()
    }
}

#[async_trait]
impl PasskeyUserStore for MemoryPasskeyStore {
    type User = MemoryUser;

    async fn find_user_by_credential_id(
        &self,
        credential_id: &[u8],
    ) -> Result<Option<MemoryUser>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .passkeys
            .get(credential_id)
            .and_then(|(owner, _)| state.users.get(owner))
            .cloned())
    }

    async fn get_stored_passkey(
        &self,
        user: &MemoryUser,
        credential_id: &[u8],
    ) -> Result<Option<UserPasskeyInfo>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .passkeys
            .get(credential_id)
            .filter(|(owner, _)| *owner == user.id)
            .map(|(_, passkey)| passkey.clone()))
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<MemoryUser>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.get(user_id).cloned())
    }

    async fn get_user_id(&self, user: &MemoryUser) -> Result<String, StoreError> {
        Ok(user.id.clone())
    }
}
