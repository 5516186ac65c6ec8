use super::handler::PasskeyHandler;
use super::types::{
    AuthenticatorSelection, PubKeyCredParam, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialDescriptor, PublicKeyCredentialRequestOptions,
    PublicKeyCredentialUserEntity, RelyingParty,
};
use crate::passkey::decode::CoseAlgorithm;
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::PasskeyUserStore;
use crate::passkey::types::{PasskeyRequestContext, UserPasskeyInfo};
use crate::utils::gen_random_bytes;

fn descriptor(passkey: &UserPasskeyInfo) -> PublicKeyCredentialDescriptor {
    PublicKeyCredentialDescriptor {
        type_: "public-key".to_string(),
        id: passkey.credential_id.clone(),
        transports: passkey.transports.clone(),
    }
}

impl<S: PasskeyUserStore> PasskeyHandler<S> {
    fn timeout_millis(&self) -> u64 {
        u64::try_from(self.options.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Options for `navigator.credentials.create()` with a fresh challenge.
    ///
    /// `exclude` lists credentials the user already has so the browser can
    /// refuse to register the same authenticator twice. The serialized
    /// options must be kept by the caller and handed back to
    /// [`perform_attestation`](Self::perform_attestation).
    pub fn make_creation_options(
        &self,
        user: PublicKeyCredentialUserEntity,
        request: &PasskeyRequestContext,
        exclude: &[UserPasskeyInfo],
    ) -> Result<PublicKeyCredentialCreationOptions, PasskeyError> {
        let challenge = gen_random_bytes(self.options.challenge_size)?;
        let rp_id = self
            .options
            .server_domain
            .clone()
            .or_else(|| request.host());
        let rp_name = self
            .options
            .rp_name
            .clone()
            .or_else(|| rp_id.clone())
            .unwrap_or_default();

        let pub_key_cred_params = CoseAlgorithm::ALL
            .iter()
            .map(|alg| PubKeyCredParam {
                type_: "public-key".to_string(),
                alg: alg.identifier(),
            })
            .collect();

        let options = PublicKeyCredentialCreationOptions {
            rp: RelyingParty {
                name: rp_name,
                id: rp_id,
            },
            user,
            challenge,
            pub_key_cred_params,
            timeout: Some(self.timeout_millis()),
            exclude_credentials: exclude.iter().map(descriptor).collect(),
            authenticator_selection: Some(AuthenticatorSelection {
                resident_key: Some("preferred".to_string()),
                user_verification: Some(self.options.user_verification.clone()),
                ..Default::default()
            }),
            attestation: Some("none".to_string()),
        };

        tracing::debug!("Creation options: {:?}", options);
        Ok(options)
    }

    /// Options for `navigator.credentials.get()` with a fresh challenge.
    ///
    /// An empty `allow` list lets the browser offer any discoverable
    /// credential for the RP.
    pub fn make_request_options(
        &self,
        allow: &[UserPasskeyInfo],
        request: &PasskeyRequestContext,
    ) -> Result<PublicKeyCredentialRequestOptions, PasskeyError> {
        let challenge = gen_random_bytes(self.options.challenge_size)?;

        let options = PublicKeyCredentialRequestOptions {
            challenge,
            timeout: Some(self.timeout_millis()),
            rp_id: self
                .options
                .server_domain
                .clone()
                .or_else(|| request.host()),
            allow_credentials: allow.iter().map(descriptor).collect(),
            user_verification: Some(self.options.user_verification.clone()),
        };

        tracing::debug!("Request options: {:?}", options);
        Ok(options)
    }
}
