use serde::{Deserialize, Serialize};

use crate::passkey::errors::PasskeyError;
use crate::utils::base64url_bytes;

/// Options passed to `navigator.credentials.create()`.
///
/// The server serializes these for the browser and later receives the same
/// JSON back alongside the credential, so the type is both `Serialize` and
/// `Deserialize`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialCreationOptions {
    pub rp: RelyingParty,
    pub user: PublicKeyCredentialUserEntity,
    #[serde(with = "base64url_bytes")]
    pub challenge: Vec<u8>,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    /// Milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_credentials: Vec<PublicKeyCredentialDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
}

/// Options passed to `navigator.credentials.get()`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialRequestOptions {
    #[serde(with = "base64url_bytes")]
    pub challenge: Vec<u8>,
    /// Milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    #[serde(default)]
    pub allow_credentials: Vec<PublicKeyCredentialDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

impl PublicKeyCredentialCreationOptions {
    pub fn to_json(&self) -> Result<String, PasskeyError> {
        serde_json::to_string(self).map_err(|e| PasskeyError::Unexpected(e.to_string()))
    }

    pub(super) fn requires_user_verification(&self) -> bool {
        self.authenticator_selection
            .as_ref()
            .and_then(|s| s.user_verification.as_deref())
            == Some("required")
    }
}

impl PublicKeyCredentialRequestOptions {
    pub fn to_json(&self) -> Result<String, PasskeyError> {
        serde_json::to_string(self).map_err(|e| PasskeyError::Unexpected(e.to_string()))
    }

    pub(super) fn requires_user_verification(&self) -> bool {
        self.user_verification.as_deref() == Some("required")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelyingParty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialUserEntity {
    /// User handle, at most 64 bytes
    #[serde(with = "base64url_bytes")]
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub type_: String,
    pub alg: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredentialDescriptor {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(with = "base64url_bytes")]
    pub id: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_resident_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

/// Credential returned by `navigator.credentials.create()`.
#[derive(Deserialize, Debug)]
pub(super) struct AttestationCredential {
    #[serde(with = "base64url_bytes")]
    pub(super) id: Vec<u8>,
    #[serde(rename = "type")]
    pub(super) type_: String,
    pub(super) response: AuthenticatorAttestationResponse,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthenticatorAttestationResponse {
    #[serde(rename = "clientDataJSON", with = "base64url_bytes")]
    pub(super) client_data_json: Vec<u8>,
    #[serde(with = "base64url_bytes")]
    pub(super) attestation_object: Vec<u8>,
    #[serde(default)]
    pub(super) transports: Option<Vec<String>>,
}

/// Credential returned by `navigator.credentials.get()`.
#[derive(Deserialize, Debug)]
pub(super) struct AssertionCredential {
    #[serde(with = "base64url_bytes")]
    pub(super) id: Vec<u8>,
    #[serde(rename = "type")]
    pub(super) type_: String,
    pub(super) response: AuthenticatorAssertionResponse,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthenticatorAssertionResponse {
    #[serde(rename = "clientDataJSON", with = "base64url_bytes")]
    pub(super) client_data_json: Vec<u8>,
    #[serde(with = "base64url_bytes")]
    pub(super) authenticator_data: Vec<u8>,
    #[serde(with = "base64url_bytes")]
    pub(super) signature: Vec<u8>,
    #[serde(default, deserialize_with = "base64url_bytes::option::deserialize")]
    pub(super) user_handle: Option<Vec<u8>>,
}

/// Client data collected by the browser (`clientDataJSON`).
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(super) struct CollectedClientData {
    #[serde(rename = "type")]
    pub(super) type_: String,
    #[serde(with = "base64url_bytes")]
    pub(super) challenge: Vec<u8>,
    pub(super) origin: String,
    #[serde(default)]
    pub(super) cross_origin: Option<bool>,
    #[serde(default)]
    pub(super) token_binding: Option<TokenBinding>,
}

/// Legacy token binding member of the client data.
#[derive(Deserialize, Debug, Clone)]
pub(super) struct TokenBinding {
    pub(super) status: String,
}
