use super::*;
use crate::password::hash_password_with_salt;

fn directory() -> Directory {
    Directory::from_config(&[
        AccountConfig::plain(
            "faculty@nitandhra.ac.in",
            "password123",
            Role::Faculty,
            Some("Prof. Sunita Mishra"),
        ),
        AccountConfig {
            email: "hod@nitandhra.ac.in".to_string(),
            password: None,
            password_hash: Some(hash_password_with_salt("hodpass", b"fixed-salt-bytes")),
            role: Role::Hod,
            display_name: None,
        },
    ])
    .expect("directory")
}

#[test]
fn authenticates_known_accounts_case_insensitively() {
    let session = directory()
        .authenticate("Faculty@NITAndhra.ac.in", "password123")
        .expect("login");
    assert!(session.authenticated);
    assert_eq!(session.role, Some(Role::Faculty));
    assert_eq!(session.display_name(), "Prof. Sunita Mishra");
}

#[test]
fn prehashed_accounts_fall_back_to_email_for_display_name() {
    let session = directory()
        .authenticate("hod@nitandhra.ac.in", "hodpass")
        .expect("login");
    assert_eq!(session.role, Some(Role::Hod));
    assert_eq!(session.display_name(), "hod@nitandhra.ac.in");
}

#[test]
fn wrong_password_and_unknown_email_look_the_same() {
    let dir = directory();
    let wrong = dir
        .authenticate("faculty@nitandhra.ac.in", "nope")
        .expect_err("wrong password");
    let unknown = dir
        .authenticate("ghost@nitandhra.ac.in", "password123")
        .expect_err("unknown email");
    assert_eq!(wrong.code, ErrorCode::Unauthorized);
    assert_eq!(wrong.message, unknown.message);
}

#[test]
fn rejects_duplicate_and_incomplete_entries() {
    let dup = Directory::from_config(&[
        AccountConfig::plain("a@x.in", "pw", Role::Student, None),
        AccountConfig::plain("A@x.in", "pw", Role::Faculty, None),
    ]);
    assert!(dup.is_err());

    let no_secret = Directory::from_config(&[AccountConfig {
        email: "b@x.in".to_string(),
        password: None,
        password_hash: None,
        role: Role::Student,
        display_name: None,
    }]);
    assert!(no_secret.is_err());
}

#[test]
fn role_checks_distinguish_anonymous_from_wrong_role() {
    let anonymous = Session::anonymous();
    assert_eq!(
        anonymous.require(&[Role::Faculty]).expect_err("anonymous").code,
        ErrorCode::Unauthorized
    );

    let mut session = directory()
        .authenticate("faculty@nitandhra.ac.in", "password123")
        .expect("login");
    assert_eq!(
        session.require(&[Role::Hod]).expect_err("wrong role").code,
        ErrorCode::Forbidden
    );
    assert_eq!(session.require(&[Role::Faculty]).expect("ok"), Role::Faculty);

    session.logout();
    assert_eq!(session, Session::anonymous());
}

#[test]
fn tokens_round_trip_the_session() {
    let keys = SessionKeys::new("unit-test-secret", 600);
    let session = directory()
        .authenticate("faculty@nitandhra.ac.in", "password123")
        .expect("login");
    let (token, expires_at) = keys.issue(&session).expect("issue");
    assert!(expires_at > Utc::now());
    assert_eq!(keys.verify(&token).expect("verify"), session);
}

#[test]
fn tokens_from_another_secret_are_rejected() {
    let session = directory()
        .authenticate("faculty@nitandhra.ac.in", "password123")
        .expect("login");
    let (token, _) = SessionKeys::new("one", 600).issue(&session).expect("issue");
    let err = SessionKeys::new("two", 600)
        .verify(&token)
        .expect_err("bad signature");
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[test]
fn expired_tokens_are_rejected() {
    let session = directory()
        .authenticate("faculty@nitandhra.ac.in", "password123")
        .expect("login");
    let keys = SessionKeys::new("secret", -3600);
    let (token, _) = keys.issue(&session).expect("issue");
    assert!(keys.verify(&token).is_err());
}

#[test]
fn oversized_ttl_fails_to_issue_instead_of_overflowing() {
    let session = directory()
        .authenticate("faculty@nitandhra.ac.in", "password123")
        .expect("login");
    for ttl in [i64::MAX, i64::MAX / 1000] {
        let err = SessionKeys::new("secret", ttl)
            .issue(&session)
            .expect_err("ttl out of range");
        assert_eq!(err.code, ErrorCode::Internal);
    }
}

#[test]
fn anonymous_sessions_cannot_be_issued_tokens() {
    let err = SessionKeys::new("secret", 60)
        .issue(&Session::anonymous())
        .expect_err("anonymous");
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[test]
fn login_returns_role_and_token() {
    let keys = SessionKeys::new("secret", 60);
    let response = login(
        &directory(),
        &keys,
        &LoginRequest {
            email: "faculty@nitandhra.ac.in".to_string(),
            password: "password123".to_string(),
        },
    )
    .expect("login");
    assert_eq!(response.role, Role::Faculty);
    assert_eq!(response.display_name, "Prof. Sunita Mishra");
    assert_eq!(
        keys.verify(&response.token).expect("verify").role,
        Some(Role::Faculty)
    );
}
