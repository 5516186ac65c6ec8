use thiserror::Error;

/// Errors raised while decoding authenticator-produced binary structures.
///
/// The ceremony code maps each one onto the matching
/// [`PasskeyError`](crate::PasskeyError) reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty where a structure was expected
    #[error("invalid byte count of 0")]
    EmptyInput,

    /// Fewer bytes remained than the structure declares
    #[error("unexpected end of input: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// Bytes remained after the structure was fully decoded
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),

    /// Malformed or unsupported CBOR item
    #[error("invalid CBOR: {0}")]
    InvalidCbor(String),

    /// A required field was missing from a CBOR map
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// The attested credential flag was set but no bytes followed the header
    #[error("attested credential data had an invalid byte count of 0")]
    EmptyAttestedCredentialData,

    /// COSE key parameters were missing or inconsistent
    #[error("invalid COSE key: {0}")]
    InvalidKey(String),

    /// COSE algorithm identifier with no verifier
    #[error("unsupported COSE algorithm {0}")]
    UnsupportedAlgorithm(i64),
}
