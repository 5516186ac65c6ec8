mod auth;
mod client_data;
mod handler;
mod options;
mod origin;
mod policy;
mod register;
mod statement;
mod types;

pub use handler::PasskeyHandler;
pub use origin::{DefaultOriginValidator, OriginValidator};
pub use statement::AttestationStatementVerifier;
pub use types::{
    AuthenticatorSelection, PubKeyCredParam, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialDescriptor, PublicKeyCredentialRequestOptions,
    PublicKeyCredentialUserEntity, RelyingParty,
};
