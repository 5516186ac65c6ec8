use thiserror::Error;

use super::storage::StoreError;
use crate::utils::UtilError;

/// Classified reasons a passkey ceremony can fail.
///
/// Every variant carries the human-readable message shown to operators.
/// The variant itself is the machine-readable discriminant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[deny(missing_docs)]
pub enum PasskeyError {
    /// The credential JSON submitted by the browser could not be read
    #[error("{0}")]
    InvalidCredentialJson(String),

    /// The round-tripped creation or request options could not be read
    #[error("{0}")]
    InvalidOptionsJson(String),

    /// `credential.type` was not `public-key`
    #[error("{0}")]
    InvalidCredentialType(String),

    /// `clientDataJSON` was not valid JSON or lacked required members
    #[error("{0}")]
    InvalidClientData(String),

    /// `clientDataJSON.type` did not match the ceremony
    #[error("{0}")]
    InvalidClientDataType(String),

    /// `clientDataJSON.challenge` did not match the issued challenge
    #[error("{0}")]
    InvalidChallenge(String),

    /// The client data origin is not accepted, or the ceremony ran in a disallowed cross-origin iframe
    #[error("{0}")]
    InvalidOrigin(String),

    /// `tokenBinding.status` was neither `present` nor `supported`
    #[error("{0}")]
    InvalidTokenBindingStatus(String),

    /// The attestation object was malformed or missing a member
    #[error("{0}")]
    InvalidAttestationObject(String),

    /// The authenticator data was empty or malformed
    #[error("{0}")]
    InvalidAuthenticatorData(String),

    /// The authenticator data was produced for a different RP ID
    #[error("{0}")]
    InvalidRelyingPartyIdHash(String),

    /// The UP flag was clear
    #[error("{0}")]
    UserNotPresent(String),

    /// The UV flag was clear while user verification was required
    #[error("{0}")]
    UserNotVerified(String),

    /// BS was set while BE was clear
    #[error("{0}")]
    BackupStateWithoutEligibility(String),

    /// The credential is not backup eligible but policy requires it
    #[error("{0}")]
    BackupEligibilityRequired(String),

    /// The credential is backup eligible but policy forbids it
    #[error("{0}")]
    BackupEligibilityDisallowed(String),

    /// The credential is not backed up but policy requires it
    #[error("{0}")]
    BackupRequired(String),

    /// The credential is backed up but policy forbids it
    #[error("{0}")]
    BackupDisallowed(String),

    /// Observed BE flag differs from the stored credential's
    #[error("{0}")]
    BackupEligibilityMismatch(String),

    /// Registration authenticator data carried no attested credential data
    #[error("{0}")]
    MissingAttestedCredentialData(String),

    /// The credential key uses an algorithm that was not offered or is not implemented
    #[error("{0}")]
    UnsupportedPublicKeyAlgorithm(String),

    /// The configured attestation statement verifier rejected the statement
    #[error("{0}")]
    InvalidAttestationStatement(String),

    /// The attested credential id was empty or longer than 1023 bytes
    #[error("{0}")]
    InvalidCredentialIdLength(String),

    /// The JSON `id` and the attested credential id differ
    #[error("{0}")]
    CredentialIdMismatch(String),

    /// The credential id is already registered to another user
    #[error("{0}")]
    CredentialAlreadyRegistered(String),

    /// The credential is not in the request's `allowCredentials`
    #[error("{0}")]
    CredentialNotAllowed(String),

    /// No stored passkey matches this credential for the resolved user
    #[error("{0}")]
    CredentialDoesNotBelongToUser(String),

    /// The response user handle differs from the identified user
    #[error("{0}")]
    UserHandleMismatch(String),

    /// Discoverable sign-in response without a user handle
    #[error("{0}")]
    MissingUserHandle(String),

    /// The assertion signature did not verify against the stored key
    #[error("{0}")]
    InvalidAssertionSignature(String),

    /// Possible cloned authenticator
    #[error("{0}")]
    SignCountNotGreater(String),

    /// Anything not classified above, including collaborator failures
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PasskeyError {
    /// The human-readable message without the variant.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidCredentialJson(m)
            | Self::InvalidOptionsJson(m)
            | Self::InvalidCredentialType(m)
            | Self::InvalidClientData(m)
            | Self::InvalidClientDataType(m)
            | Self::InvalidChallenge(m)
            | Self::InvalidOrigin(m)
            | Self::InvalidTokenBindingStatus(m)
            | Self::InvalidAttestationObject(m)
            | Self::InvalidAuthenticatorData(m)
            | Self::InvalidRelyingPartyIdHash(m)
            | Self::UserNotPresent(m)
            | Self::UserNotVerified(m)
            | Self::BackupStateWithoutEligibility(m)
            | Self::BackupEligibilityRequired(m)
            | Self::BackupEligibilityDisallowed(m)
            | Self::BackupRequired(m)
            | Self::BackupDisallowed(m)
            | Self::BackupEligibilityMismatch(m)
            | Self::MissingAttestedCredentialData(m)
            | Self::UnsupportedPublicKeyAlgorithm(m)
            | Self::InvalidAttestationStatement(m)
            | Self::InvalidCredentialIdLength(m)
            | Self::CredentialIdMismatch(m)
            | Self::CredentialAlreadyRegistered(m)
            | Self::CredentialNotAllowed(m)
            | Self::CredentialDoesNotBelongToUser(m)
            | Self::UserHandleMismatch(m)
            | Self::MissingUserHandle(m)
            | Self::InvalidAssertionSignature(m)
            | Self::SignCountNotGreater(m)
            | Self::Unexpected(m) => m,
        }
    }
}

impl From<StoreError> for PasskeyError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Passkey store operation failed: {}", err);
        PasskeyError::Unexpected(err.to_string())
    }
}

impl From<UtilError> for PasskeyError {
    fn from(err: UtilError) -> Self {
        PasskeyError::Unexpected(err.to_string())
    }
}
