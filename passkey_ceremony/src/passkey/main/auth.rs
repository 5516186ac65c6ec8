use super::client_data::{GET_TYPE, verify_client_data};
use super::handler::{PasskeyHandler, authenticator_data_error};
use super::policy::{
    verify_backup_consistency, verify_backup_eligibility_policy, verify_backup_state_policy,
    verify_stored_backup_eligibility,
};
use super::types::{AssertionCredential, PublicKeyCredentialRequestOptions};
use crate::passkey::decode::{AuthenticatorData, CredentialPublicKey};
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::PasskeyUserStore;
use crate::passkey::types::{
    AssertionResult, PasskeyAssertion, PasskeyRequestContext, UserPasskeyInfo,
};
use crate::utils::{base64url_encode, sha256};

impl<S: PasskeyUserStore> PasskeyHandler<S> {
    /// Verifies a sign-in response.
    ///
    /// `user` is the account already identified before the ceremony (for
    /// example by username), or `None` for a discoverable-credential flow
    /// where the user handle in the response identifies the account.
    ///
    /// On success the returned record carries the new sign count, backup
    /// state and user verification flag. Persisting it, atomically with
    /// respect to other sign-ins on the same credential, is up to the
    /// caller.
    pub async fn perform_assertion(
        &self,
        credential_json: &str,
        original_options_json: &str,
        request: &PasskeyRequestContext,
        user: Option<S::User>,
    ) -> AssertionResult<S::User> {
        let result = self
            .verify_assertion(credential_json, original_options_json, request, user)
            .await;

        match &result {
            Ok(assertion) => tracing::info!(
                "Passkey assertion succeeded for credential {} (sign count {})",
                base64url_encode(&assertion.passkey.credential_id),
                assertion.passkey.sign_count
            ),
            Err(e) => tracing::warn!("Passkey assertion failed: {:?}", e),
        }

        result
    }

    async fn verify_assertion(
        &self,
        credential_json: &str,
        original_options_json: &str,
        request: &PasskeyRequestContext,
        user: Option<S::User>,
    ) -> AssertionResult<S::User> {
        let credential: AssertionCredential =
            serde_json::from_str(credential_json).map_err(|e| {
                PasskeyError::InvalidCredentialJson(format!(
                    "The assertion credential JSON had an invalid format: {e}"
                ))
            })?;
        let options: PublicKeyCredentialRequestOptions =
            serde_json::from_str(original_options_json).map_err(|e| {
                PasskeyError::InvalidOptionsJson(format!(
                    "The original passkey request options had an invalid format: {e}"
                ))
            })?;

        if credential.type_ != "public-key" {
            return Err(PasskeyError::InvalidCredentialType(format!(
                "Expected credential type 'public-key', got '{}'",
                credential.type_
            )));
        }

        if !options.allow_credentials.is_empty()
            && !options
                .allow_credentials
                .iter()
                .any(|allowed| allowed.id == credential.id)
        {
            return Err(PasskeyError::CredentialNotAllowed(
                "The provided credential ID was not in the list of allowed credentials".to_string(),
            ));
        }

        let response = &credential.response;
        verify_client_data(
            &response.client_data_json,
            GET_TYPE,
            &options.challenge,
            self.origin_validator.as_ref(),
            request,
        )?;

        let (user, stored) = self
            .resolve_user_and_passkey(&credential.id, response.user_handle.as_deref(), user)
            .await?;

        let auth_data =
            AuthenticatorData::decode(&response.authenticator_data).map_err(authenticator_data_error)?;

        let rp_id = self.resolve_rp_id(options.rp_id.as_deref(), request)?;
        self.verify_authenticator_flags(&auth_data, &rp_id, options.requires_user_verification())?;

        let backup_eligible = auth_data.is_backup_eligible();
        let backed_up = auth_data.is_backed_up();
        verify_backup_consistency(backup_eligible, backed_up)?;
        verify_stored_backup_eligibility(stored.is_backup_eligible, backup_eligible)?;
        verify_backup_eligibility_policy(
            self.options.backup_eligible_credential_policy,
            backup_eligible,
        )?;
        verify_backup_state_policy(self.options.backed_up_credential_policy, backed_up)?;

        verify_signature(
            &stored,
            &response.authenticator_data,
            &response.client_data_json,
            &response.signature,
        )?;

        verify_counter(auth_data.sign_count, stored.sign_count)?;

        let passkey = UserPasskeyInfo {
            sign_count: auth_data.sign_count,
            is_backed_up: backed_up,
            is_user_verified: auth_data.is_user_verified(),
            ..stored
        };

        Ok(PasskeyAssertion { user, passkey })
    }

    /// Finds the account and stored credential the assertion is for.
    ///
    /// With a pre-identified user the credential must belong to them and any
    /// user handle must match their id. Without one the user handle is
    /// required and selects the account.
    async fn resolve_user_and_passkey(
        &self,
        credential_id: &[u8],
        user_handle: Option<&[u8]>,
        user: Option<S::User>,
    ) -> Result<(S::User, UserPasskeyInfo), PasskeyError> {
        let not_owned = || {
            PasskeyError::CredentialDoesNotBelongToUser(
                "The provided credential does not belong to the specified user".to_string(),
            )
        };

        match user {
            Some(user) => {
                let stored = self
                    .store
                    .get_stored_passkey(&user, credential_id)
                    .await?
                    .ok_or_else(not_owned)?;

                if let Some(handle) = user_handle {
                    let user_id = self.store.get_user_id(&user).await?;
                    if handle != user_id.as_bytes() {
                        return Err(PasskeyError::UserHandleMismatch(format!(
                            "The provided user handle '{}' does not match the user's ID '{}'",
                            base64url_encode(handle),
                            base64url_encode(user_id.as_bytes())
                        )));
                    }
                }

                Ok((user, stored))
            }
            None => {
                let handle = user_handle.ok_or_else(|| {
                    PasskeyError::MissingUserHandle(
                        "The authenticator response was missing a user handle".to_string(),
                    )
                })?;

                // A handle that is not UTF-8 cannot name any user
                let user_id = std::str::from_utf8(handle).map_err(|_| not_owned())?;
                let user = self
                    .store
                    .find_user_by_id(user_id)
                    .await?
                    .ok_or_else(not_owned)?;
                let stored = self
                    .store
                    .get_stored_passkey(&user, credential_id)
                    .await?
                    .ok_or_else(not_owned)?;

                Ok((user, stored))
            }
        }
    }
}

/// Verifies the assertion signature over `authenticatorData || SHA-256(clientDataJSON)`
/// with the stored public key.
fn verify_signature(
    stored: &UserPasskeyInfo,
    authenticator_data: &[u8],
    client_data_json: &[u8],
    signature: &[u8],
) -> Result<(), PasskeyError> {
    let public_key = CredentialPublicKey::from_cose(&stored.public_key).map_err(|e| {
        tracing::error!("Stored public key could not be decoded: {}", e);
        PasskeyError::Unexpected(format!("The stored credential public key is invalid: {e}"))
    })?;

    let client_data_hash = sha256(client_data_json);
    let mut signed_data = Vec::with_capacity(authenticator_data.len() + client_data_hash.len());
    signed_data.extend_from_slice(authenticator_data);
    signed_data.extend_from_slice(&client_data_hash);

    tracing::debug!(
        "Verifying {} signature over {} bytes",
        public_key.algorithm(),
        signed_data.len()
    );

    if !public_key.verify(&signed_data, signature) {
        return Err(PasskeyError::InvalidAssertionSignature(
            "The assertion signature was invalid".to_string(),
        ));
    }
    Ok(())
}

/// Verifies the authenticator counter to detect cloned authenticators.
///
/// When both counters are zero the authenticator does not keep a counter
/// and the check is skipped. Otherwise the counter must strictly increase.
fn verify_counter(received: u32, stored: u32) -> Result<(), PasskeyError> {
    if received == 0 && stored == 0 {
        tracing::debug!("Authenticator does not support counters");
        return Ok(());
    }

    if received <= stored {
        tracing::warn!(
            "Counter verification failed - stored: {}, received: {}",
            stored,
            received
        );
        return Err(PasskeyError::SignCountNotGreater(format!(
            "The authenticator's signature counter is unexpectedly less than or equal to the stored signature counter ({received} <= {stored})"
        )));
    }

    Ok(())
}
