use super::types::PubKeyCredParam;
use crate::passkey::config::CredentialBackupPolicy;
use crate::passkey::decode::CoseAlgorithm;
use crate::passkey::errors::PasskeyError;

/// A credential cannot be backed up without being eligible for backup.
pub(super) fn verify_backup_consistency(
    backup_eligible: bool,
    backed_up: bool,
) -> Result<(), PasskeyError> {
    if !backup_eligible && backed_up {
        return Err(PasskeyError::BackupStateWithoutEligibility(
            "The credential is backed up, but the authenticator data flags did not have the 'BackupEligible' flag".to_string(),
        ));
    }
    Ok(())
}

pub(super) fn verify_backup_eligibility_policy(
    policy: CredentialBackupPolicy,
    backup_eligible: bool,
) -> Result<(), PasskeyError> {
    match (policy, backup_eligible) {
        (CredentialBackupPolicy::Required, false) => {
            Err(PasskeyError::BackupEligibilityRequired(
                "Credential backup eligibility is required, but the credential was not eligible for backup".to_string(),
            ))
        }
        (CredentialBackupPolicy::Disallowed, true) => {
            Err(PasskeyError::BackupEligibilityDisallowed(
                "Credential backup eligibility is disallowed, but the credential was eligible for backup".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

pub(super) fn verify_backup_state_policy(
    policy: CredentialBackupPolicy,
    backed_up: bool,
) -> Result<(), PasskeyError> {
    match (policy, backed_up) {
        (CredentialBackupPolicy::Required, false) => Err(PasskeyError::BackupRequired(
            "Credential backup is required, but the credential was not backed up".to_string(),
        )),
        (CredentialBackupPolicy::Disallowed, true) => Err(PasskeyError::BackupDisallowed(
            "Credential backup is disallowed, but the credential was backed up".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Eligibility is fixed when a credential is created and must not change.
pub(super) fn verify_stored_backup_eligibility(
    stored_backup_eligible: bool,
    backup_eligible: bool,
) -> Result<(), PasskeyError> {
    match (stored_backup_eligible, backup_eligible) {
        (true, false) => Err(PasskeyError::BackupEligibilityMismatch(
            "The stored credential is eligible for backup, but the provided credential was unexpectedly ineligible for backup.".to_string(),
        )),
        (false, true) => Err(PasskeyError::BackupEligibilityMismatch(
            "The stored credential is ineligible for backup, but the provided credential was unexpectedly eligible for backup".to_string(),
        )),
        _ => Ok(()),
    }
}

/// The attested key must use one of the algorithms offered in the options.
pub(super) fn verify_algorithm(
    algorithm: CoseAlgorithm,
    params: &[PubKeyCredParam],
) -> Result<(), PasskeyError> {
    let offered = params
        .iter()
        .any(|p| p.type_ == "public-key" && p.alg == algorithm.identifier());
    if !offered {
        tracing::debug!(
            "Credential algorithm {} not among {:?}",
            algorithm,
            params.iter().map(|p| p.alg).collect::<Vec<_>>()
        );
        return Err(PasskeyError::UnsupportedPublicKeyAlgorithm(
            "The credential public key algorithm does not match any of the supported algorithms"
                .to_string(),
        ));
    }
    Ok(())
}
