use ciborium::value::Value as CborValue;

use super::cbor;
use super::errors::ParseError;

/// The CBOR attestation object returned from `navigator.credentials.create()`.
///
/// Only the three top-level members are extracted. `att_stmt` holds the
/// statement map re-encoded as CBOR for whichever statement verifier is
/// plugged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationObject {
    pub fmt: String,
    pub att_stmt: Vec<u8>,
    pub auth_data: Vec<u8>,
}

impl AttestationObject {
    pub fn decode(data: &[u8]) -> Result<Self, ParseError> {
        if data.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let (entries, len) = cbor::read_map(data)?;
        if len < data.len() {
            return Err(ParseError::TrailingBytes(data.len() - len));
        }

        let mut fmt = None;
        let mut att_stmt = None;
        let mut auth_data = None;

        for (key, value) in entries {
            let CborValue::Text(key) = key else {
                return Err(ParseError::InvalidCbor(
                    "attestation object keys must be text".to_string(),
                ));
            };
            match (key.as_str(), value) {
                ("fmt", CborValue::Text(value)) => set_once(&mut fmt, value, "fmt")?,
                ("attStmt", value @ CborValue::Map(_)) => {
                    set_once(&mut att_stmt, cbor::to_bytes(&value)?, "attStmt")?
                }
                ("authData", CborValue::Bytes(value)) => {
                    set_once(&mut auth_data, value, "authData")?
                }
                ("fmt" | "attStmt" | "authData", _) => {
                    return Err(ParseError::InvalidCbor(format!(
                        "'{key}' member has the wrong type"
                    )));
                }
                (other, _) => {
                    tracing::debug!("Ignoring unknown attestation object member '{}'", other);
                }
            }
        }

        Ok(Self {
            fmt: fmt.ok_or(ParseError::MissingField("fmt"))?,
            att_stmt: att_stmt.ok_or(ParseError::MissingField("attStmt"))?,
            auth_data: auth_data.ok_or(ParseError::MissingField("authData"))?,
        })
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &str) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::InvalidCbor(format!("duplicate '{name}' member")));
    }
    *slot = Some(value);
    Ok(())
}
