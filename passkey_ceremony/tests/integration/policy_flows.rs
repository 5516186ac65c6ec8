use crate::common::{
    AssertionInput, AttestationInput, SoftAuthenticator, USER_ID, default_options, handler,
    register, request,
};
use passkey_ceremony::{CredentialBackupPolicy, PasskeyError, PasskeyOptions, flags};

const POLICIES: [CredentialBackupPolicy; 3] = [
    CredentialBackupPolicy::Required,
    CredentialBackupPolicy::Allowed,
    CredentialBackupPolicy::Disallowed,
];

/// (backup eligible, backed up) combinations an honest authenticator reports.
const STATES: [(bool, bool); 3] = [(false, false), (true, false), (true, true)];

fn permits(policy: CredentialBackupPolicy, flag: bool) -> bool {
    match policy {
        CredentialBackupPolicy::Required => flag,
        CredentialBackupPolicy::Allowed => true,
        CredentialBackupPolicy::Disallowed => !flag,
    }
}

fn flag_bits(backup_eligible: bool, backed_up: bool) -> u8 {
    let mut bits = flags::UP | flags::UV;
    if backup_eligible {
        bits |= flags::BE;
    }
    if backed_up {
        bits |= flags::BS;
    }
    bits
}

fn policy_options(
    eligible_policy: CredentialBackupPolicy,
    backed_up_policy: CredentialBackupPolicy,
) -> PasskeyOptions {
    PasskeyOptions {
        backup_eligible_credential_policy: eligible_policy,
        backed_up_credential_policy: backed_up_policy,
        ..default_options()
    }
}

/// Which policy check, in check order, should reject the flags.
fn expected_violation(
    eligible_policy: CredentialBackupPolicy,
    backed_up_policy: CredentialBackupPolicy,
    backup_eligible: bool,
    backed_up: bool,
) -> Option<&'static str> {
    if !permits(eligible_policy, backup_eligible) {
        return Some("eligibility");
    }
    if !permits(backed_up_policy, backed_up) {
        return Some("state");
    }
    None
}

fn violation_kind(err: &PasskeyError) -> &'static str {
    match err {
        PasskeyError::BackupEligibilityRequired(_) | PasskeyError::BackupEligibilityDisallowed(_) => {
            "eligibility"
        }
        PasskeyError::BackupRequired(_) | PasskeyError::BackupDisallowed(_) => "state",
        _ => "other",
    }
}

#[tokio::test]
async fn test_attestation_policy_matrix() {
    for eligible_policy in POLICIES {
        for backed_up_policy in POLICIES {
            let handler = handler(policy_options(eligible_policy, backed_up_policy)).await;
            for (backup_eligible, backed_up) in STATES {
                let authenticator = SoftAuthenticator::es256(b"matrix");
                let input = AttestationInput {
                    flags: flag_bits(backup_eligible, backed_up),
                    ..Default::default()
                };
                let (credential, options) = input.build(&authenticator);
                let result = handler
                    .perform_attestation(&credential, &options, &request())
                    .await;

                let case = format!(
                    "{eligible_policy:?}/{backed_up_policy:?} with BE={backup_eligible} BS={backed_up}"
                );
                match expected_violation(eligible_policy, backed_up_policy, backup_eligible, backed_up)
                {
                    None => {
                        let passkey = result.unwrap_or_else(|e| panic!("{case}: {e:?}"));
                        assert_eq!(passkey.is_backup_eligible, backup_eligible, "{case}");
                        assert_eq!(passkey.is_backed_up, backed_up, "{case}");
                    }
                    Some(kind) => {
                        let err = result.expect_err(&case);
                        assert_eq!(violation_kind(&err), kind, "{case}: {err:?}");
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn test_assertion_policy_matrix() {
    for eligible_policy in POLICIES {
        for backed_up_policy in POLICIES {
            for (backup_eligible, backed_up) in STATES {
                let case = format!(
                    "{eligible_policy:?}/{backed_up_policy:?} with BE={backup_eligible} BS={backed_up}"
                );

                // Register under a permissive policy, then sign in under the
                // policy being tested with the same eligibility.
                let permissive = handler(default_options()).await;
                let authenticator = SoftAuthenticator::es256(b"matrix");
                register(
                    &permissive,
                    &authenticator,
                    USER_ID,
                    &AttestationInput {
                        flags: flag_bits(backup_eligible, false),
                        ..Default::default()
                    },
                )
                .await;
                let stored = permissive.store().passkeys_for(USER_ID).await;

                let strict = handler(policy_options(eligible_policy, backed_up_policy)).await;
                strict
                    .store()
                    .add_passkey(USER_ID, stored[0].clone())
                    .await
                    .unwrap();

                let input = AssertionInput {
                    flags: flag_bits(backup_eligible, backed_up),
                    ..Default::default()
                };
                let (credential, options) = input.build(&authenticator);
                let result = strict
                    .perform_assertion(&credential, &options, &request(), None)
                    .await;

                match expected_violation(eligible_policy, backed_up_policy, backup_eligible, backed_up)
                {
                    None => {
                        let assertion = result.unwrap_or_else(|e| panic!("{case}: {e:?}"));
                        assert_eq!(assertion.passkey.is_backed_up, backed_up, "{case}");
                    }
                    Some(kind) => {
                        let err = result.expect_err(&case);
                        assert_eq!(violation_kind(&err), kind, "{case}: {err:?}");
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn test_backed_up_without_eligibility_fails_under_every_policy() {
    for eligible_policy in POLICIES {
        for backed_up_policy in POLICIES {
            let handler = handler(policy_options(eligible_policy, backed_up_policy)).await;
            let authenticator = SoftAuthenticator::es256(b"inconsistent");
            let input = AttestationInput {
                flags: flag_bits(false, true),
                ..Default::default()
            };
            let (credential, options) = input.build(&authenticator);
            assert!(matches!(
                handler
                    .perform_attestation(&credential, &options, &request())
                    .await,
                Err(PasskeyError::BackupStateWithoutEligibility(_))
            ));
        }
    }
}
