mod config;
mod decode;
mod errors;
mod main;
mod storage;
mod types;

pub use config::{CredentialBackupPolicy, PasskeyOptions};
pub use decode::{
    AUTHENTICATOR_DATA_HEADER_LEN, AttestationObject, AttestedCredentialData, AuthenticatorData,
    CoseAlgorithm, CredentialPublicKey, ParseError, flags,
};
pub use errors::PasskeyError;
pub use main::{
    AttestationStatementVerifier, AuthenticatorSelection, DefaultOriginValidator,
    OriginValidator, PasskeyHandler, PubKeyCredParam, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialDescriptor, PublicKeyCredentialRequestOptions,
    PublicKeyCredentialUserEntity, RelyingParty,
};
pub use storage::{MemoryPasskeyStore, MemoryUser, PasskeyUserStore, StoreError};
pub use types::{
    AssertionResult, AttestationResult, PasskeyAssertion, PasskeyOriginInfo,
    PasskeyRequestContext, UserPasskeyInfo,
};
