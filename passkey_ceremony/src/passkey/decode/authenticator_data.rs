use uuid::Uuid;

use super::cbor;
use super::cursor::ByteCursor;
use super::errors::ParseError;
use super::public_key::CredentialPublicKey;

/// Length of the fixed authenticator data header.
pub const AUTHENTICATOR_DATA_HEADER_LEN: usize = 37;

/// Authenticator data flag bits
pub mod flags {
    /// User Present - Bit 0
    pub const UP: u8 = 1 << 0;
    /// User Verified - Bit 2
    pub const UV: u8 = 1 << 2;
    /// Backup Eligibility - Bit 3
    pub const BE: u8 = 1 << 3;
    /// Backup State - Bit 4
    pub const BS: u8 = 1 << 4;
    /// Attested Credential Data Present - Bit 6
    pub const AT: u8 = 1 << 6;
    /// Extension Data Present - Bit 7
    pub const ED: u8 = 1 << 7;
}

/// The credential block that follows the header when [`flags::AT`] is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    pub credential_public_key: CredentialPublicKey,
}

impl AttestedCredentialData {
    /// AAGUID as a hyphenated UUID, e.g. for logging the authenticator model.
    pub fn aaguid_string(&self) -> String {
        Uuid::from_bytes(self.aaguid).hyphenated().to_string()
    }
}

/// Parsed authenticator data.
///
/// Format (minimum 37 bytes):
/// - RP ID Hash (32 bytes)
/// - Flags (1 byte)
/// - Counter (4 bytes, big-endian)
/// - Optional: Attested Credential Data
/// - Optional: Extensions (one CBOR map)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: u8,
    pub sign_count: u32,
    pub attested_credential_data: Option<AttestedCredentialData>,
    /// Raw CBOR of the extensions map; kept but not interpreted
    pub extensions: Option<Vec<u8>>,
}

impl AuthenticatorData {
    pub fn decode(data: &[u8]) -> Result<Self, ParseError> {
        if data.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut cursor = ByteCursor::new(data);
        let rp_id_hash = cursor.read_array::<32>()?;
        let flags = cursor.read_u8()?;
        let sign_count = cursor.read_u32_be()?;

        let attested_credential_data = if flags & flags::AT != 0 {
            if cursor.is_empty() {
                return Err(ParseError::EmptyAttestedCredentialData);
            }
            Some(decode_attested_credential_data(&mut cursor)?)
        } else {
            None
        };

        let extensions = if flags & flags::ED != 0 {
            let (_, len) = cbor::read_map(cursor.rest())?;
            Some(cursor.read_bytes(len)?.to_vec())
        } else {
            None
        };

        cursor.finish()?;

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential_data,
            extensions,
        })
    }

    pub fn is_user_present(&self) -> bool {
        (self.flags & flags::UP) != 0
    }

    pub fn is_user_verified(&self) -> bool {
        (self.flags & flags::UV) != 0
    }

    pub fn is_backup_eligible(&self) -> bool {
        (self.flags & flags::BE) != 0
    }

    pub fn is_backed_up(&self) -> bool {
        (self.flags & flags::BS) != 0
    }

    pub fn has_attested_credential_data(&self) -> bool {
        (self.flags & flags::AT) != 0
    }

    pub fn has_extension_data(&self) -> bool {
        (self.flags & flags::ED) != 0
    }
}

fn decode_attested_credential_data(
    cursor: &mut ByteCursor<'_>,
) -> Result<AttestedCredentialData, ParseError> {
    let aaguid = cursor.read_array::<16>()?;
    let credential_id_len = usize::from(cursor.read_u16_be()?);
    let credential_id = cursor.read_bytes(credential_id_len)?.to_vec();

    // The COSE key carries no length prefix
    let (_, key_len) = cbor::read_item(cursor.rest())?;
    let credential_public_key = CredentialPublicKey::from_cose(cursor.read_bytes(key_len)?)?;

    Ok(AttestedCredentialData {
        aaguid,
        credential_id,
        credential_public_key,
    })
}
