use async_trait::async_trait;

/// Verifies the format-specific attestation statement of a new credential.
///
/// No statement formats are built in. When a handler has no verifier, the
/// attestation statement is accepted without inspection.
#[async_trait]
pub trait AttestationStatementVerifier: Send + Sync {
    /// `attestation_object` is the raw CBOR attestation object and
    /// `client_data_hash` the SHA-256 of the raw `clientDataJSON`.
    async fn verify(&self, attestation_object: &[u8], client_data_hash: &[u8]) -> bool;
}
