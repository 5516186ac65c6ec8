use std::fmt;

use ciborium::value::{Integer, Value as CborValue};
use p521::ecdsa::signature::Verifier;
use ring::signature::{self, RsaPublicKeyComponents, UnparsedPublicKey};

use super::cbor;
use super::errors::ParseError;

// COSE key map labels (RFC 9052 / RFC 9053)
const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV_OR_N: i64 = -1;
const LABEL_X_OR_E: i64 = -2;
const LABEL_Y: i64 = -3;

const KTY_OKP: i64 = 1;
const KTY_EC2: i64 = 2;
const KTY_RSA: i64 = 3;

const CRV_P256: i64 = 1;
const CRV_P384: i64 = 2;
const CRV_P521: i64 = 3;
const CRV_ED25519: i64 = 6;

/// COSE signature algorithms a credential public key may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoseAlgorithm {
    /// ECDSA over P-256 with SHA-256
    Es256,
    /// ECDSA over P-384 with SHA-384
    Es384,
    /// ECDSA over P-521 with SHA-512
    Es512,
    /// Ed25519
    EdDsa,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    Rs512,
    /// RSASSA-PSS with SHA-256
    Ps256,
    /// RSASSA-PSS with SHA-384
    Ps384,
    /// RSASSA-PSS with SHA-512
    Ps512,
}

impl CoseAlgorithm {
    /// Every algorithm this crate can verify, in order of preference.
    pub const ALL: [CoseAlgorithm; 10] = [
        CoseAlgorithm::Es256,
        CoseAlgorithm::EdDsa,
        CoseAlgorithm::Es384,
        CoseAlgorithm::Es512,
        CoseAlgorithm::Ps256,
        CoseAlgorithm::Ps384,
        CoseAlgorithm::Ps512,
        CoseAlgorithm::Rs256,
        CoseAlgorithm::Rs384,
        CoseAlgorithm::Rs512,
    ];

    pub fn from_identifier(id: i64) -> Option<Self> {
        match id {
            -7 => Some(Self::Es256),
            -35 => Some(Self::Es384),
            -36 => Some(Self::Es512),
            -8 => Some(Self::EdDsa),
            -257 => Some(Self::Rs256),
            -258 => Some(Self::Rs384),
            -259 => Some(Self::Rs512),
            -37 => Some(Self::Ps256),
            -38 => Some(Self::Ps384),
            -39 => Some(Self::Ps512),
            _ => None,
        }
    }

    /// The IANA COSE algorithm identifier.
    pub fn identifier(self) -> i64 {
        match self {
            Self::Es256 => -7,
            Self::Es384 => -35,
            Self::Es512 => -36,
            Self::EdDsa => -8,
            Self::Rs256 => -257,
            Self::Rs384 => -258,
            Self::Rs512 => -259,
            Self::Ps256 => -37,
            Self::Ps384 => -38,
            Self::Ps512 => -39,
        }
    }

    fn rsa_parameters(self) -> Option<&'static signature::RsaParameters> {
        match self {
            Self::Rs256 => Some(&signature::RSA_PKCS1_2048_8192_SHA256),
            Self::Rs384 => Some(&signature::RSA_PKCS1_2048_8192_SHA384),
            Self::Rs512 => Some(&signature::RSA_PKCS1_2048_8192_SHA512),
            Self::Ps256 => Some(&signature::RSA_PSS_2048_8192_SHA256),
            Self::Ps384 => Some(&signature::RSA_PSS_2048_8192_SHA384),
            Self::Ps512 => Some(&signature::RSA_PSS_2048_8192_SHA512),
            _ => None,
        }
    }
}

impl fmt::Display for CoseAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
            Self::EdDsa => "EdDSA",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Ps256 => "PS256",
            Self::Ps384 => "PS384",
            Self::Ps512 => "PS512",
        };
        write!(f, "{name} ({})", self.identifier())
    }
}

#[derive(Clone, PartialEq, Eq)]
enum KeyMaterial {
    /// SEC1 uncompressed point (0x04 || x || y)
    Ec(Vec<u8>),
    Ed25519(Vec<u8>),
    Rsa { n: Vec<u8>, e: Vec<u8> },
}

/// A credential public key decoded from its COSE_Key encoding.
///
/// The original encoding is retained so the key can be persisted exactly
/// as the authenticator produced it.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPublicKey {
    algorithm: CoseAlgorithm,
    material: KeyMaterial,
    cose: Vec<u8>,
}

impl fmt::Debug for CredentialPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPublicKey")
            .field("algorithm", &self.algorithm)
            .field("cose_len", &self.cose.len())
            .finish()
    }
}

impl CredentialPublicKey {
    /// Decodes a COSE_Key. `bytes` must hold exactly one CBOR map.
    pub fn from_cose(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let (value, len) = cbor::read_item(bytes)?;
        if len < bytes.len() {
            return Err(ParseError::TrailingBytes(bytes.len() - len));
        }

        let CborValue::Map(entries) = value else {
            return Err(ParseError::InvalidKey("COSE key is not a map".to_string()));
        };

        let params = CoseParams::collect(entries)?;

        let alg = params.int(LABEL_ALG)?.ok_or(ParseError::InvalidKey(
            "missing 'alg' parameter".to_string(),
        ))?;
        let algorithm =
            CoseAlgorithm::from_identifier(alg).ok_or(ParseError::UnsupportedAlgorithm(alg))?;
        let kty = params.int(LABEL_KTY)?.ok_or(ParseError::InvalidKey(
            "missing 'kty' parameter".to_string(),
        ))?;

        let material = match algorithm {
            CoseAlgorithm::Es256 => ec2_point(&params, kty, CRV_P256, 32)?,
            CoseAlgorithm::Es384 => ec2_point(&params, kty, CRV_P384, 48)?,
            CoseAlgorithm::Es512 => ec2_point(&params, kty, CRV_P521, 66)?,
            CoseAlgorithm::EdDsa => {
                expect_kty(kty, KTY_OKP)?;
                expect_crv(&params, CRV_ED25519)?;
                let x = params.bytes(LABEL_X_OR_E, "x")?;
                if x.len() != 32 {
                    return Err(ParseError::InvalidKey(format!(
                        "Ed25519 key must be 32 bytes, got {}",
                        x.len()
                    )));
                }
                KeyMaterial::Ed25519(x.to_vec())
            }
            _ => {
                expect_kty(kty, KTY_RSA)?;
                let n = params.bytes(LABEL_CRV_OR_N, "n")?;
                let e = params.bytes(LABEL_X_OR_E, "e")?;
                if n.is_empty() || e.is_empty() {
                    return Err(ParseError::InvalidKey(
                        "RSA modulus and exponent must not be empty".to_string(),
                    ));
                }
                KeyMaterial::Rsa {
                    n: n.to_vec(),
                    e: e.to_vec(),
                }
            }
        };

        Ok(Self {
            algorithm,
            material,
            cose: bytes.to_vec(),
        })
    }

    pub fn algorithm(&self) -> CoseAlgorithm {
        self.algorithm
    }

    /// The COSE_Key bytes this key was decoded from.
    pub fn as_cose_bytes(&self) -> &[u8] {
        &self.cose
    }

    /// Checks `signature` over `message` with this key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match &self.material {
            KeyMaterial::Ec(point) => {
                let alg: &signature::EcdsaVerificationAlgorithm = match self.algorithm {
                    CoseAlgorithm::Es512 => return verify_p521(point, message, signature),
                    CoseAlgorithm::Es384 => &signature::ECDSA_P384_SHA384_ASN1,
                    _ => &signature::ECDSA_P256_SHA256_ASN1,
                };
                UnparsedPublicKey::new(alg, point)
                    .verify(message, signature)
                    .is_ok()
            }
            KeyMaterial::Ed25519(x) => UnparsedPublicKey::new(&signature::ED25519, x)
                .verify(message, signature)
                .is_ok(),
            KeyMaterial::Rsa { n, e } => match self.algorithm.rsa_parameters() {
                Some(params) => RsaPublicKeyComponents {
                    n: n.as_slice(),
                    e: e.as_slice(),
                }
                .verify(params, message, signature)
                .is_ok(),
                None => false,
            },
        }
    }
}

/// ES512 check. ring has no P-521 curve; the signature is DER encoded.
fn verify_p521(point: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(key) = p521::ecdsa::VerifyingKey::from_sec1_bytes(point) else {
        return false;
    };
    let Ok(signature) = p521::ecdsa::Signature::from_der(signature) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}

/// Integer-labelled COSE parameters, duplicates rejected.
struct CoseParams(Vec<(i64, CborValue)>);

impl CoseParams {
    fn collect(entries: Vec<(CborValue, CborValue)>) -> Result<Self, ParseError> {
        let mut params: Vec<(i64, CborValue)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            // Text labels are legal COSE but never needed for verification
            let CborValue::Integer(label) = key else {
                continue;
            };
            let label = integer_to_i64(label)?;
            if params.iter().any(|(l, _)| *l == label) {
                return Err(ParseError::InvalidKey(format!(
                    "duplicate COSE key parameter {label}"
                )));
            }
            params.push((label, value));
        }
        Ok(Self(params))
    }

    fn get(&self, label: i64) -> Option<&CborValue> {
        self.0.iter().find(|(l, _)| *l == label).map(|(_, v)| v)
    }

    fn int(&self, label: i64) -> Result<Option<i64>, ParseError> {
        match self.get(label) {
            None => Ok(None),
            Some(CborValue::Integer(i)) => integer_to_i64(*i).map(Some),
            Some(_) => Err(ParseError::InvalidKey(format!(
                "COSE key parameter {label} is not an integer"
            ))),
        }
    }

    fn bytes(&self, label: i64, name: &str) -> Result<&[u8], ParseError> {
        match self.get(label) {
            Some(CborValue::Bytes(b)) => Ok(b),
            Some(_) => Err(ParseError::InvalidKey(format!(
                "COSE key parameter '{name}' is not a byte string"
            ))),
            None => Err(ParseError::InvalidKey(format!(
                "missing '{name}' parameter"
            ))),
        }
    }
}

fn integer_to_i64(value: Integer) -> Result<i64, ParseError> {
    i64::try_from(value)
        .map_err(|_| ParseError::InvalidKey("integer out of range".to_string()))
}

fn expect_kty(kty: i64, expected: i64) -> Result<(), ParseError> {
    if kty != expected {
        return Err(ParseError::InvalidKey(format!(
            "key type {kty} does not match algorithm (expected {expected})"
        )));
    }
    Ok(())
}

fn expect_crv(params: &CoseParams, expected: i64) -> Result<(), ParseError> {
    match params.int(LABEL_CRV_OR_N)? {
        Some(crv) if crv == expected => Ok(()),
        Some(crv) => Err(ParseError::InvalidKey(format!(
            "curve {crv} does not match algorithm (expected {expected})"
        ))),
        None => Err(ParseError::InvalidKey("missing 'crv' parameter".to_string())),
    }
}

fn ec2_point(
    params: &CoseParams,
    kty: i64,
    crv: i64,
    coordinate_len: usize,
) -> Result<KeyMaterial, ParseError> {
    expect_kty(kty, KTY_EC2)?;
    expect_crv(params, crv)?;
    let x = params.bytes(LABEL_X_OR_E, "x")?;
    let y = params.bytes(LABEL_Y, "y")?;
    if x.len() != coordinate_len || y.len() != coordinate_len {
        return Err(ParseError::InvalidKey(format!(
            "EC2 coordinates must be {coordinate_len} bytes"
        )));
    }

    let mut point = Vec::with_capacity(1 + 2 * coordinate_len);
    point.push(0x04); // Uncompressed point format
    point.extend_from_slice(x);
    point.extend_from_slice(y);
    Ok(KeyMaterial::Ec(point))
}
