use crate::common::{
    AssertionInput, AttestationInput, OTHER_USER_ID, SoftAuthenticator, USER_ID, alice, bob,
    default_options, handler, register, request,
};
use passkey_ceremony::{
    CoseAlgorithm, CredentialPublicKey, MemoryPasskeyStore, PasskeyError, PasskeyHandler,
    UserPasskeyInfo, flags,
};

/// Handler with one ES256 passkey registered to alice at counter zero.
async fn registered() -> (
    PasskeyHandler<MemoryPasskeyStore>,
    SoftAuthenticator,
    UserPasskeyInfo,
) {
    let handler = handler(default_options()).await;
    let authenticator = SoftAuthenticator::es256(b"alice-passkey");
    let passkey = register(
        &handler,
        &authenticator,
        USER_ID,
        &AttestationInput::default(),
    )
    .await;
    (handler, authenticator, passkey)
}

async fn assert_fails(input: &AssertionInput) -> PasskeyError {
    let (handler, authenticator, _) = registered().await;
    let (credential, options) = input.build(&authenticator);
    handler
        .perform_assertion(&credential, &options, &request(), None)
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_discoverable_sign_in_updates_record() {
    let (handler, authenticator, registered) = registered().await;
    let input = AssertionInput {
        counter: 5,
        flags: flags::UP,
        ..Default::default()
    };
    let (credential, options) = input.build(&authenticator);

    let assertion = handler
        .perform_assertion(&credential, &options, &request(), None)
        .await
        .unwrap();

    assert_eq!(assertion.user, alice());
    assert_eq!(assertion.passkey.credential_id, registered.credential_id);
    assert_eq!(assertion.passkey.public_key, registered.public_key);
    assert_eq!(assertion.passkey.created_at, registered.created_at);
    assert_eq!(assertion.passkey.sign_count, 5);
    assert!(registered.is_user_verified);
    assert!(!assertion.passkey.is_user_verified);
    assert!(!assertion.passkey.is_backed_up);
}

#[tokio::test]
async fn test_sign_in_with_identified_user() {
    let (handler, authenticator, _) = registered().await;

    // The user handle may be omitted when the user is already known
    let input = AssertionInput {
        user_handle: None,
        allow_credentials: vec![authenticator.credential_id.clone()],
        ..Default::default()
    };
    let (credential, options) = input.build(&authenticator);
    let assertion = handler
        .perform_assertion(&credential, &options, &request(), Some(alice()))
        .await
        .unwrap();
    assert_eq!(assertion.user, alice());
    assert_eq!(assertion.passkey.sign_count, 1);
}

#[tokio::test]
async fn test_ed25519_sign_in() {
    let handler = handler(default_options()).await;
    let authenticator = SoftAuthenticator::ed25519(b"ed25519-passkey");
    register(
        &handler,
        &authenticator,
        USER_ID,
        &AttestationInput::default(),
    )
    .await;

    let (credential, options) = AssertionInput::default().build(&authenticator);
    assert!(
        handler
            .perform_assertion(&credential, &options, &request(), None)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_every_supported_algorithm_signs_in() {
    for algorithm in CoseAlgorithm::ALL {
        let handler = handler(default_options()).await;
        let authenticator = SoftAuthenticator::new(algorithm, algorithm.to_string().as_bytes());
        let registered = register(
            &handler,
            &authenticator,
            USER_ID,
            &AttestationInput {
                algorithms: vec![algorithm.identifier()],
                ..Default::default()
            },
        )
        .await;
        let key = CredentialPublicKey::from_cose(&registered.public_key).unwrap();
        assert_eq!(key.algorithm(), algorithm);

        let (credential, options) = AssertionInput::default().build(&authenticator);
        let assertion = handler
            .perform_assertion(&credential, &options, &request(), None)
            .await
            .unwrap_or_else(|e| panic!("{algorithm}: {e:?}"));
        assert_eq!(assertion.passkey.sign_count, 1, "{algorithm}");

        let tampered = AssertionInput {
            counter: 2,
            tamper_client_data: true,
            ..Default::default()
        };
        let (credential, options) = tampered.build(&authenticator);
        let result = handler
            .perform_assertion(&credential, &options, &request(), None)
            .await;
        assert!(
            matches!(result, Err(PasskeyError::InvalidAssertionSignature(_))),
            "{algorithm}: {result:?}"
        );
    }
}

#[tokio::test]
async fn test_sign_count_must_increase() {
    let (handler, authenticator, _) = registered().await;

    let input = AssertionInput {
        counter: 2,
        ..Default::default()
    };
    let (credential, options) = input.build(&authenticator);
    let assertion = handler
        .perform_assertion(&credential, &options, &request(), None)
        .await
        .unwrap();
    handler
        .store()
        .update_passkey(assertion.passkey)
        .await
        .unwrap();

    for counter in [1, 2] {
        let input = AssertionInput {
            counter,
            ..Default::default()
        };
        let (credential, options) = input.build(&authenticator);
        assert!(matches!(
            handler
                .perform_assertion(&credential, &options, &request(), None)
                .await,
            Err(PasskeyError::SignCountNotGreater(_))
        ));
    }

    let input = AssertionInput {
        counter: 3,
        ..Default::default()
    };
    let (credential, options) = input.build(&authenticator);
    assert!(
        handler
            .perform_assertion(&credential, &options, &request(), None)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_zero_counters_are_not_compared() {
    let (handler, authenticator, registered) = registered().await;
    assert_eq!(registered.sign_count, 0);

    let input = AssertionInput {
        counter: 0,
        ..Default::default()
    };
    for _ in 0..2 {
        let (credential, options) = input.build(&authenticator);
        let assertion = handler
            .perform_assertion(&credential, &options, &request(), None)
            .await
            .unwrap();
        assert_eq!(assertion.passkey.sign_count, 0);
    }
}

#[tokio::test]
async fn test_tampered_client_data_fails_signature() {
    let input = AssertionInput {
        tamper_client_data: true,
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::InvalidAssertionSignature(_)
    ));
}

#[tokio::test]
async fn test_signature_from_another_key_fails() {
    let (handler, _, _) = registered().await;
    let impostor = SoftAuthenticator::es256(b"alice-passkey");
    let (credential, options) = AssertionInput::default().build(&impostor);
    assert!(matches!(
        handler
            .perform_assertion(&credential, &options, &request(), None)
            .await,
        Err(PasskeyError::InvalidAssertionSignature(_))
    ));
}

#[tokio::test]
async fn test_allow_credentials() {
    let input = AssertionInput {
        allow_credentials: vec![b"some-other-passkey".to_vec()],
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::CredentialNotAllowed(_)
    ));
}

#[tokio::test]
async fn test_client_data_checks() {
    let input = AssertionInput {
        client_type: "webauthn.create".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::InvalidClientDataType(_)
    ));

    let input = AssertionInput {
        options_challenge: vec![1; 32],
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::InvalidChallenge(_)
    ));

    let input = AssertionInput {
        origin: "http://example.com".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::InvalidOrigin(_)
    ));

    let input = AssertionInput {
        credential_type: "otp".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::InvalidCredentialType(_)
    ));
}

#[tokio::test]
async fn test_authenticator_data_checks() {
    let input = AssertionInput {
        auth_data_rp_id: "evil.example.net".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::InvalidRelyingPartyIdHash(_)
    ));

    let input = AssertionInput {
        flags: 0,
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::UserNotPresent(_)
    ));

    let input = AssertionInput {
        flags: flags::UP,
        user_verification: Some("required".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::UserNotVerified(_)
    ));
}

#[tokio::test]
async fn test_user_handle_resolution() {
    let (handler, authenticator, _) = registered().await;

    let input = AssertionInput {
        user_handle: None,
        ..Default::default()
    };
    let (credential, options) = input.build(&authenticator);
    assert!(matches!(
        handler
            .perform_assertion(&credential, &options, &request(), None)
            .await,
        Err(PasskeyError::MissingUserHandle(_))
    ));

    for handle in [b"unknown-user".to_vec(), vec![0xff, 0xfe], OTHER_USER_ID.as_bytes().to_vec()] {
        let input = AssertionInput {
            user_handle: Some(handle),
            ..Default::default()
        };
        let (credential, options) = input.build(&authenticator);
        assert!(matches!(
            handler
                .perform_assertion(&credential, &options, &request(), None)
                .await,
            Err(PasskeyError::CredentialDoesNotBelongToUser(_))
        ));
    }

    // Identified user whose handle disagrees with the response
    let input = AssertionInput {
        user_handle: Some(OTHER_USER_ID.as_bytes().to_vec()),
        ..Default::default()
    };
    let (credential, options) = input.build(&authenticator);
    assert!(matches!(
        handler
            .perform_assertion(&credential, &options, &request(), Some(alice()))
            .await,
        Err(PasskeyError::UserHandleMismatch(_))
    ));

    // Identified user who does not own the credential
    let (credential, options) = AssertionInput::default().build(&authenticator);
    assert!(matches!(
        handler
            .perform_assertion(&credential, &options, &request(), Some(bob()))
            .await,
        Err(PasskeyError::CredentialDoesNotBelongToUser(_))
    ));
}

#[tokio::test]
async fn test_unknown_credential() {
    let (handler, _, _) = registered().await;
    let stranger = SoftAuthenticator::es256(b"never-registered");
    let (credential, options) = AssertionInput::default().build(&stranger);
    assert!(matches!(
        handler
            .perform_assertion(&credential, &options, &request(), None)
            .await,
        Err(PasskeyError::CredentialDoesNotBelongToUser(_))
    ));
}

#[tokio::test]
async fn test_backup_eligibility_cannot_change() {
    // Registered as not eligible, now claims eligibility
    let input = AssertionInput {
        flags: flags::UP | flags::UV | flags::BE,
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::BackupEligibilityMismatch(_)
    ));

    // Registered as eligible, now claims ineligibility
    let handler = handler(default_options()).await;
    let authenticator = SoftAuthenticator::es256(b"synced-passkey");
    let registered = register(
        &handler,
        &authenticator,
        USER_ID,
        &AttestationInput {
            flags: flags::UP | flags::UV | flags::BE,
            ..Default::default()
        },
    )
    .await;
    assert!(registered.is_backup_eligible);
    assert!(!registered.is_backed_up);

    let (credential, options) = AssertionInput::default().build(&authenticator);
    assert!(matches!(
        handler
            .perform_assertion(&credential, &options, &request(), None)
            .await,
        Err(PasskeyError::BackupEligibilityMismatch(_))
    ));

    // Eligible both times and now backed up
    let input = AssertionInput {
        flags: flags::UP | flags::UV | flags::BE | flags::BS,
        ..Default::default()
    };
    let (credential, options) = input.build(&authenticator);
    let assertion = handler
        .perform_assertion(&credential, &options, &request(), None)
        .await
        .unwrap();
    assert!(assertion.passkey.is_backup_eligible);
    assert!(assertion.passkey.is_backed_up);
}

#[tokio::test]
async fn test_backed_up_without_eligibility() {
    let input = AssertionInput {
        flags: flags::UP | flags::BS,
        ..Default::default()
    };
    assert!(matches!(
        assert_fails(&input).await,
        PasskeyError::BackupStateWithoutEligibility(_)
    ));
}

#[tokio::test]
async fn test_request_options_round_trip_through_assertion() {
    let (handler, authenticator, registered) = registered().await;
    let issued = handler
        .make_request_options(std::slice::from_ref(&registered), &request())
        .unwrap();

    let input = AssertionInput {
        challenge: issued.challenge.clone(),
        ..Default::default()
    };
    let (credential, _) = input.build(&authenticator);

    let assertion = handler
        .perform_assertion(
            &credential,
            &issued.to_json().unwrap(),
            &request(),
            Some(alice()),
        )
        .await
        .unwrap();
    assert_eq!(assertion.passkey.sign_count, 1);
}
