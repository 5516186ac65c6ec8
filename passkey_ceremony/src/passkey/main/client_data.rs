use subtle::ConstantTimeEq;

use super::origin::OriginValidator;
use super::types::CollectedClientData;
use crate::passkey::errors::PasskeyError;
use crate::passkey::types::{PasskeyOriginInfo, PasskeyRequestContext};

pub(super) const CREATE_TYPE: &str = "webauthn.create";
pub(super) const GET_TYPE: &str = "webauthn.get";

const TOKEN_BINDING_STATUSES: [&str; 3] = ["supported", "present", "not-supported"];

/// Checks the parts of `clientDataJSON` shared by both ceremonies.
///
/// 1. Parses the JSON
/// 2. Verifies type
/// 3. Verifies challenge (byte-exact, constant time)
/// 4. Verifies origin
/// 5. Verifies token binding status, if present
pub(super) fn verify_client_data(
    client_data_json: &[u8],
    expected_type: &str,
    expected_challenge: &[u8],
    origin_validator: &dyn OriginValidator,
    request: &PasskeyRequestContext,
) -> Result<CollectedClientData, PasskeyError> {
    let client_data: CollectedClientData =
        serde_json::from_slice(client_data_json).map_err(|e| {
            PasskeyError::InvalidClientData(format!(
                "The client data JSON had an invalid format: {e}"
            ))
        })?;

    tracing::debug!("Client data: {:#?}", client_data);

    if client_data.type_ != expected_type {
        return Err(PasskeyError::InvalidClientDataType(format!(
            "Expected the client data JSON 'type' field to be '{expected_type}'"
        )));
    }

    let challenge_matches: bool = client_data
        .challenge
        .as_slice()
        .ct_eq(expected_challenge)
        .into();
    if !challenge_matches {
        return Err(PasskeyError::InvalidChallenge(
            "The authenticator response challenge does not match original challenge".to_string(),
        ));
    }

    let origin_info = PasskeyOriginInfo::new(
        client_data.origin.clone(),
        client_data.cross_origin.unwrap_or(false),
    );
    if !origin_validator.is_valid_origin(&origin_info, request) {
        return Err(PasskeyError::InvalidOrigin(format!(
            "The authenticator response had an invalid origin '{}'",
            client_data.origin
        )));
    }

    if let Some(token_binding) = &client_data.token_binding {
        if !TOKEN_BINDING_STATUSES.contains(&token_binding.status.as_str()) {
            return Err(PasskeyError::InvalidTokenBindingStatus(format!(
                "Invalid token binding status '{}'",
                token_binding.status
            )));
        }
    }

    Ok(client_data)
}
