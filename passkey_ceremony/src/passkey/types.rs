use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::PasskeyError;
use crate::utils::base64url_bytes;

/// Stored credential information for a WebAuthn/Passkey.
///
/// Created once by a successful attestation, then updated after every
/// successful assertion (`sign_count`, `is_user_verified`, `is_backed_up`).
/// The ceremonies never persist this record themselves; they hand back the
/// new values and the embedding application writes them.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserPasskeyInfo {
    /// Raw credential ID bytes
    #[serde(with = "base64url_bytes")]
    pub credential_id: Vec<u8>,
    /// COSE_Key encoding of the credential public key
    #[serde(with = "base64url_bytes")]
    pub public_key: Vec<u8>,
    /// Friendly name chosen by the user, if any
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Counter value for the credential (used to detect cloned authenticators)
    pub sign_count: u32,
    /// Transport hints reported by the browser
    pub transports: Option<Vec<String>>,
    pub is_user_verified: bool,
    /// Fixed for the lifetime of the credential
    pub is_backup_eligible: bool,
    pub is_backed_up: bool,
    /// Raw attestation object, kept for audit
    #[serde(with = "base64url_bytes")]
    pub attestation_object: Vec<u8>,
    /// Raw client data JSON from registration, kept for audit
    #[serde(with = "base64url_bytes")]
    pub client_data_json: Vec<u8>,
}

/// The origin a browser claims in its client data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasskeyOriginInfo {
    pub origin: String,
    pub cross_origin: bool,
}

impl PasskeyOriginInfo {
    pub fn new(origin: impl Into<String>, cross_origin: bool) -> Self {
        Self {
            origin: origin.into(),
            cross_origin,
        }
    }
}

/// Facts about the HTTP request that is running the ceremony.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasskeyRequestContext {
    /// Origin the request was served on, e.g. `https://example.com:8443`
    pub origin: Option<String>,
}

impl PasskeyRequestContext {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
        }
    }

    /// Host part of the request origin, used as the fallback RP ID.
    pub fn host(&self) -> Option<String> {
        let origin = self.origin.as_deref()?;
        url::Url::parse(origin)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }
}

/// A verified assertion: who signed in, and the credential record to persist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasskeyAssertion<U> {
    pub user: U,
    pub passkey: UserPasskeyInfo,
}

pub type AttestationResult = Result<UserPasskeyInfo, PasskeyError>;

pub type AssertionResult<U> = Result<PasskeyAssertion<U>, PasskeyError>;
