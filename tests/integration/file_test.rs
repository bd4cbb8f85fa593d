//! Upload quota flows.

use portal_core::error::ErrorKind;
use portal_entity::quota::QuotaOwner;
use portal_entity::user::Role;
use portal_auth::login::Credential;

use crate::helpers::{CLIENT, TestApp};

#[tokio::test]
async fn test_quota_blocks_oversized_upload() {
    let app = TestApp::new();
    let alice = app.create_user("alice", "correct horse", Role::User, 1000).await;
    let owner = QuotaOwner::User(alice.id);
    let mut session = app.login_user("alice", "correct horse").await;
    let ctx = app.ctx(&mut session);

    app.upload(&ctx, "first.bin", 900).await.unwrap();
    let err = app.upload(&ctx, "second.bin", 150).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    assert_eq!(app.blobs.len().await, 1);

    app.upload(&ctx, "third.bin", 100).await.unwrap();
    let usage = app.ledger.usage(owner).await.unwrap();
    assert_eq!(usage.used_bytes, 1000);
    assert_eq!(usage.usage_percent, 100.0);
}

#[tokio::test]
async fn test_delete_returns_quota() {
    let app = TestApp::new();
    let alice = app.create_user("alice", "correct horse", Role::User, 1000).await;
    let mut session = app.login_user("alice", "correct horse").await;
    let ctx = app.ctx(&mut session);

    let file = app.upload(&ctx, "notes.md", 700).await.unwrap();
    app.files.delete(&ctx, file.id).await.unwrap();

    let usage = app.ledger.usage(QuotaOwner::User(alice.id)).await.unwrap();
    assert_eq!(usage.used_bytes, 0);
    assert_eq!(app.blobs.len().await, 0);
}

#[tokio::test]
async fn test_access_code_session_uploads_against_code() {
    let app = TestApp::new();
    let code = app.create_code("GUEST-UPLOAD", 3, 500).await;
    let mut session = app
        .login(
            Credential::AccessCode {
                code: "GUEST-UPLOAD".to_string(),
            },
            CLIENT,
        )
        .await
        .unwrap();
    let ctx = app.ctx(&mut session);

    let file = app.upload(&ctx, "photo.jpg", 400).await.unwrap();
    assert_eq!(file.owner_code_id, Some(code.id));

    let err = app.upload(&ctx, "photo2.jpg", 200).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
}

#[tokio::test]
async fn test_owner_lists_and_downloads_own_files() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 1000).await;
    app.create_user("bob", "battery staple", Role::User, 1000).await;
    app.create_user("root", "admin horse", Role::Admin, 1000).await;

    let mut alice_session = app.login_user("alice", "correct horse").await;
    let alice = app.ctx(&mut alice_session);
    let mut bob_session = app.login_user("bob", "battery staple").await;
    let bob = app.ctx(&mut bob_session);
    let mut admin_session = app.login_user("root", "admin horse").await;
    let admin = app.ctx(&mut admin_session);

    let file = app.upload(&alice, "report.pdf", 64).await.unwrap();
    app.upload(&bob, "bob.txt", 8).await.unwrap();

    let listed = app.files.list(&alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, file.id);
    assert_eq!(app.files.list(&admin).await.unwrap().len(), 2);

    let (_, data) = app.files.download(&alice, file.id).await.unwrap();
    assert_eq!(data.len(), 64);
    let err = app.files.download(&bob, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
}
