//! Decoders for the binary structures an authenticator hands back.
//!
//! Fixed-layout fields go through a bounds-checked cursor and CBOR items
//! through `ciborium`. Malformed input is reported as a [`ParseError`].

mod attestation_object;
mod authenticator_data;
mod cbor;
mod cursor;
mod errors;
mod public_key;

pub use attestation_object::AttestationObject;
pub use authenticator_data::{
    AUTHENTICATOR_DATA_HEADER_LEN, AttestedCredentialData, AuthenticatorData, flags,
};
pub use errors::ParseError;
pub use public_key::{CoseAlgorithm, CredentialPublicKey};
