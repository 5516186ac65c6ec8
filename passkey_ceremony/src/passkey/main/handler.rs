use super::origin::{DefaultOriginValidator, OriginValidator};
use super::statement::AttestationStatementVerifier;
use crate::passkey::config::PasskeyOptions;
use crate::passkey::decode::{AuthenticatorData, ParseError};
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::PasskeyUserStore;
use crate::passkey::types::PasskeyRequestContext;
use crate::utils::sha256;

/// Runs passkey registration and sign-in ceremonies.
///
/// The handler owns no mutable state. Each ceremony decodes its own inputs,
/// reads from the store, and returns the credential record the caller
/// should persist. Dropping a ceremony future before it resolves leaves the
/// store untouched.
pub struct PasskeyHandler<S: PasskeyUserStore> {
    pub(super) options: PasskeyOptions,
    pub(super) store: S,
    pub(super) origin_validator: Box<dyn OriginValidator>,
    pub(super) attestation_verifier: Option<Box<dyn AttestationStatementVerifier>>,
}

impl<S: PasskeyUserStore> PasskeyHandler<S> {
    /// Creates a handler using [`DefaultOriginValidator`] and no attestation
    /// statement verification.
    pub fn new(options: PasskeyOptions, store: S) -> Self {
        let origin_validator = Box::new(DefaultOriginValidator::new(&options));
        Self {
            options,
            store,
            origin_validator,
            attestation_verifier: None,
        }
    }

    pub fn with_origin_validator(mut self, validator: impl OriginValidator + 'static) -> Self {
        self.origin_validator = Box::new(validator);
        self
    }

    pub fn with_attestation_verifier(
        mut self,
        verifier: impl AttestationStatementVerifier + 'static,
    ) -> Self {
        self.attestation_verifier = Some(Box::new(verifier));
        self
    }

    pub fn options(&self) -> &PasskeyOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// RP ID from the options, else the configured server domain, else the
    /// host of the current request.
    pub(super) fn resolve_rp_id(
        &self,
        from_options: Option<&str>,
        request: &PasskeyRequestContext,
    ) -> Result<String, PasskeyError> {
        from_options
            .map(str::to_string)
            .or_else(|| self.options.server_domain.clone())
            .or_else(|| request.host())
            .ok_or_else(|| {
                PasskeyError::Unexpected("Unable to determine the Relying Party ID".to_string())
            })
    }

    /// Checks performed on authenticator data by both ceremonies:
    /// RP ID hash, user presence, then user verification when required.
    pub(super) fn verify_authenticator_flags(
        &self,
        auth_data: &AuthenticatorData,
        rp_id: &str,
        user_verification_required: bool,
    ) -> Result<(), PasskeyError> {
        if auth_data.rp_id_hash != sha256(rp_id.as_bytes()) {
            tracing::debug!("RP ID hash does not match '{}'", rp_id);
            return Err(PasskeyError::InvalidRelyingPartyIdHash(
                "The authenticator data included an invalid Relying Party ID hash".to_string(),
            ));
        }

        if !auth_data.is_user_present() {
            return Err(PasskeyError::UserNotPresent(
                "The authenticator data flags did not include the 'UserPresent' flag".to_string(),
            ));
        }

        if user_verification_required && !auth_data.is_user_verified() {
            return Err(PasskeyError::UserNotVerified(
                "User verification is required, but the authenticator data flags did not have the 'UserVerified' flag".to_string(),
            ));
        }

        tracing::debug!(
            "Authenticator flags - user verified: {}, backup eligible: {}, backed up: {}",
            auth_data.is_user_verified(),
            auth_data.is_backup_eligible(),
            auth_data.is_backed_up()
        );
        Ok(())
    }
}

/// Maps a decoder failure on authenticator data to its ceremony reason.
pub(super) fn authenticator_data_error(err: ParseError) -> PasskeyError {
    match err {
        ParseError::EmptyInput => PasskeyError::InvalidAuthenticatorData(
            "The authenticator data had an invalid byte count of 0".to_string(),
        ),
        ParseError::EmptyAttestedCredentialData => PasskeyError::InvalidAuthenticatorData(
            "The attested credential data had an invalid byte count of 0".to_string(),
        ),
        ParseError::UnsupportedAlgorithm(alg) => {
            tracing::debug!("Unsupported COSE algorithm {}", alg);
            PasskeyError::UnsupportedPublicKeyAlgorithm(
                "The credential public key algorithm does not match any of the supported algorithms"
                    .to_string(),
            )
        }
        other => PasskeyError::InvalidAuthenticatorData(format!(
            "The authenticator data had an invalid format: {other}"
        )),
    }
}

/// Maps a decoder failure on the attestation object to its ceremony reason.
pub(super) fn attestation_object_error(err: ParseError) -> PasskeyError {
    match err {
        ParseError::MissingField("fmt") => PasskeyError::InvalidAttestationObject(
            "The attestation object did not include an attestation statement format".to_string(),
        ),
        ParseError::MissingField("attStmt") => PasskeyError::InvalidAttestationObject(
            "The attestation object did not include an attestation statement".to_string(),
        ),
        ParseError::MissingField("authData") => PasskeyError::InvalidAttestationObject(
            "The attestation object did not include authenticator data".to_string(),
        ),
        other => PasskeyError::InvalidAttestationObject(format!(
            "The attestation object had an invalid format: {other}"
        )),
    }
}
