//! Login, lockout and session flows.

use std::net::{IpAddr, Ipv4Addr};

use futures::future::join_all;

use portal_auth::login::Credential;
use portal_auth::password::PasswordChange;
use portal_core::error::ErrorKind;
use portal_entity::user::Role;

use crate::helpers::{CLIENT, TestApp};

fn password(username: &str, password: &str) -> Credential {
    Credential::Password {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_binds_session() {
    let app = TestApp::new();
    let alice = app.create_user("alice", "correct horse", Role::User, 1000).await;

    let mut session = app.login_user("alice", "correct horse").await;
    assert!(app.sessions.is_authenticated(&mut session));

    let ctx = app.ctx(&mut session);
    let principal = ctx.principal.expect("bound principal");
    assert_eq!(principal.id, alice.id);
    assert_eq!(principal.role, Role::User);
}

#[tokio::test]
async fn test_rejections_share_public_message() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 1000).await;

    let wrong = app
        .login(password("alice", "nope"), CLIENT)
        .await
        .unwrap_err();
    let unknown = app
        .login(password("mallory", "nope"), CLIENT)
        .await
        .unwrap_err();

    assert_eq!(wrong.kind, ErrorKind::InvalidCredentials);
    assert_eq!(unknown.kind, ErrorKind::InvalidCredentials);
    assert_eq!(wrong.public_message(), unknown.public_message());
}

#[tokio::test]
async fn test_lockout_after_max_attempts() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 1000).await;
    let max = app.config.auth.max_login_attempts;

    for _ in 0..max {
        let err = app
            .login(password("alice", "nope"), CLIENT)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }

    let locked = app
        .login(password("alice", "correct horse"), CLIENT)
        .await
        .unwrap_err();
    assert_eq!(locked.kind, ErrorKind::RateLimited);
    assert_eq!(locked.public_message(), "Invalid username or password.");

    let elsewhere = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1));
    assert!(app
        .login(password("alice", "correct horse"), elsewhere)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_access_code_concurrent_logins() {
    let app = TestApp::new();
    app.create_code("TEAM-OFFSITE", 2, 5000).await;

    let attempts = (0..6u8).map(|i| {
        let addr = IpAddr::V4(Ipv4Addr::new(10, 1, 0, i));
        app.login(
            Credential::AccessCode {
                code: "TEAM-OFFSITE".to_string(),
            },
            addr,
        )
    });
    let results = join_all(attempts).await;

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 2);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.kind == ErrorKind::CodeExhausted));
}

#[tokio::test]
async fn test_logout_clears_principal() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 1000).await;
    let mut session = app.login_user("alice", "correct horse").await;

    let token = app.sessions.csrf_token(&mut session);
    assert_eq!(app.sessions.csrf_token(&mut session), token);
    assert!(app.sessions.verify_csrf(&mut session, &token));
    assert!(!app.sessions.verify_csrf(&mut session, &token));

    app.sessions.logout(&mut session);
    assert!(!app.sessions.is_authenticated(&mut session));
    assert!(app.ctx(&mut session).principal.is_none());
}

#[tokio::test]
async fn test_password_change_takes_effect_at_next_login() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 1000).await;
    let mut session = app.login_user("alice", "correct horse").await;
    let principal = app.ctx(&mut session).principal.expect("bound principal");

    app.passwords
        .change_password(
            &principal,
            &PasswordChange {
                current: "correct horse".to_string(),
                new: "amber-Signal-47-orchard".to_string(),
                confirm: "amber-Signal-47-orchard".to_string(),
            },
        )
        .await
        .unwrap();

    let err = app
        .login(password("alice", "correct horse"), CLIENT)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    app.login_user("alice", "amber-Signal-47-orchard").await;
}
