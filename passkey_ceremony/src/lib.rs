//! passkey-ceremony - WebAuthn passkey verification for relying-party servers
//!
//! This crate verifies the two WebAuthn ceremonies on the server side:
//! registration (attestation) and sign-in (assertion). It decodes the
//! authenticator's binary structures, checks every protocol step, and
//! returns either a credential record to persist or a classified
//! [`PasskeyError`].
//!
//! Persistence, sessions and HTTP routing stay with the application, which
//! supplies user lookups through [`PasskeyUserStore`].

mod passkey;
mod utils;

pub use passkey::{
    AUTHENTICATOR_DATA_HEADER_LEN, AssertionResult, AttestationObject, AttestationResult,
    AttestationStatementVerifier, AttestedCredentialData, AuthenticatorData,
    AuthenticatorSelection, CoseAlgorithm, CredentialBackupPolicy, CredentialPublicKey,
    DefaultOriginValidator, MemoryPasskeyStore, MemoryUser, OriginValidator, ParseError,
    PasskeyAssertion, PasskeyError, PasskeyHandler, PasskeyOptions, PasskeyOriginInfo,
    PasskeyRequestContext, PasskeyUserStore, PubKeyCredParam, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialDescriptor, PublicKeyCredentialRequestOptions,
    PublicKeyCredentialUserEntity, RelyingParty, StoreError, UserPasskeyInfo, flags,
};
pub use utils::UtilError;
