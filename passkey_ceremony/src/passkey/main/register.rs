use chrono::Utc;

use super::client_data::{CREATE_TYPE, verify_client_data};
use super::handler::{PasskeyHandler, attestation_object_error, authenticator_data_error};
use super::policy::{
    verify_algorithm, verify_backup_consistency, verify_backup_eligibility_policy,
    verify_backup_state_policy,
};
use super::types::{AttestationCredential, PublicKeyCredentialCreationOptions};
use crate::passkey::decode::{AttestationObject, AuthenticatorData};
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::PasskeyUserStore;
use crate::passkey::types::{AttestationResult, PasskeyRequestContext, UserPasskeyInfo};
use crate::utils::{base64url_encode, sha256};

/// Credential ids longer than this are rejected.
const MAX_CREDENTIAL_ID_LEN: usize = 1023;

impl<S: PasskeyUserStore> PasskeyHandler<S> {
    /// Verifies a registration response.
    ///
    /// `credential_json` is the serialized result of
    /// `navigator.credentials.create()` and `original_options_json` the
    /// creation options the server issued for it. On success the new
    /// credential record is returned for the caller to store.
    pub async fn perform_attestation(
        &self,
        credential_json: &str,
        original_options_json: &str,
        request: &PasskeyRequestContext,
    ) -> AttestationResult {
        let result = self
            .verify_attestation(credential_json, original_options_json, request)
            .await;

        match &result {
            Ok(passkey) => tracing::info!(
                "Passkey attestation succeeded for credential {}",
                base64url_encode(&passkey.credential_id)
            ),
            Err(e) => tracing::warn!("Passkey attestation failed: {:?}", e),
        }

        result
    }

    async fn verify_attestation(
        &self,
        credential_json: &str,
        original_options_json: &str,
        request: &PasskeyRequestContext,
    ) -> AttestationResult {
        // Step 1: Deserialize both payloads
        let credential: AttestationCredential =
            serde_json::from_str(credential_json).map_err(|e| {
                PasskeyError::InvalidCredentialJson(format!(
                    "The attestation credential JSON had an invalid format: {e}"
                ))
            })?;
        let options: PublicKeyCredentialCreationOptions =
            serde_json::from_str(original_options_json).map_err(|e| {
                PasskeyError::InvalidOptionsJson(format!(
                    "The original passkey creation options had an invalid format: {e}"
                ))
            })?;

        // Step 2: Credential type
        if credential.type_ != "public-key" {
            return Err(PasskeyError::InvalidCredentialType(format!(
                "Expected credential type 'public-key', got '{}'",
                credential.type_
            )));
        }

        // Steps 3-6: Client data type, challenge, origin and token binding
        let response = &credential.response;
        verify_client_data(
            &response.client_data_json,
            CREATE_TYPE,
            &options.challenge,
            self.origin_validator.as_ref(),
            request,
        )?;

        // Step 7: Hash of the exact client data bytes
        let client_data_hash = sha256(&response.client_data_json);

        // Step 8: Attestation object and authenticator data
        let attestation_object = AttestationObject::decode(&response.attestation_object)
            .map_err(attestation_object_error)?;
        tracing::debug!("Attestation format: {}", attestation_object.fmt);
        let auth_data =
            AuthenticatorData::decode(&attestation_object.auth_data).map_err(authenticator_data_error)?;

        // Steps 9-11: RP ID hash, user presence and verification
        let rp_id = self.resolve_rp_id(options.rp.id.as_deref(), request)?;
        self.verify_authenticator_flags(&auth_data, &rp_id, options.requires_user_verification())?;

        // Steps 12-13: Backup flags
        let backup_eligible = auth_data.is_backup_eligible();
        let backed_up = auth_data.is_backed_up();
        verify_backup_consistency(backup_eligible, backed_up)?;
        verify_backup_eligibility_policy(
            self.options.backup_eligible_credential_policy,
            backup_eligible,
        )?;
        verify_backup_state_policy(self.options.backed_up_credential_policy, backed_up)?;

        // Step 14: Attested credential and its algorithm
        let attested = auth_data.attested_credential_data.as_ref().ok_or_else(|| {
            PasskeyError::MissingAttestedCredentialData(
                "No attested credential data was provided by the authenticator".to_string(),
            )
        })?;
        verify_algorithm(
            attested.credential_public_key.algorithm(),
            &options.pub_key_cred_params,
        )?;
        tracing::debug!("Authenticator AAGUID: {}", attested.aaguid_string());

        // Step 15: Attestation statement
        if let Some(verifier) = &self.attestation_verifier {
            if !verifier
                .verify(&response.attestation_object, &client_data_hash)
                .await
            {
                return Err(PasskeyError::InvalidAttestationStatement(
                    "The attestation statement was not valid".to_string(),
                ));
            }
        }

        // Step 16: Credential id length
        let credential_id = &attested.credential_id;
        if credential_id.is_empty() || credential_id.len() > MAX_CREDENTIAL_ID_LEN {
            return Err(PasskeyError::InvalidCredentialIdLength(format!(
                "Expected the credential ID to have a length between 1 and {MAX_CREDENTIAL_ID_LEN} bytes, but got {}",
                credential_id.len()
            )));
        }

        if credential.id != *credential_id {
            return Err(PasskeyError::CredentialIdMismatch(
                "The provided credential ID does not match the credential ID in the attested credential data".to_string(),
            ));
        }

        // Step 17: Credential ids are unique across all users
        if self
            .store
            .find_user_by_credential_id(credential_id)
            .await?
            .is_some()
        {
            return Err(PasskeyError::CredentialAlreadyRegistered(
                "The credential is already registered for a user".to_string(),
            ));
        }

        // Step 18: New credential record
        Ok(UserPasskeyInfo {
            credential_id: credential_id.clone(),
            public_key: attested.credential_public_key.as_cose_bytes().to_vec(),
            name: None,
            created_at: Utc::now(),
            sign_count: auth_data.sign_count,
            transports: response.transports.clone(),
            is_user_verified: auth_data.is_user_verified(),
            is_backup_eligible: backup_eligible,
            is_backed_up: backed_up,
            attestation_object: response.attestation_object.clone(),
            client_data_json: response.client_data_json.clone(),
        })
    }
}
