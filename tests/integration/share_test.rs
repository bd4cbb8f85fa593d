//! Share link flows from creation to anonymous download.

use chrono::{Duration, Utc};
use futures::future::join_all;

use portal_core::error::ErrorKind;
use portal_entity::user::Role;
use portal_service::share::{ShareOptions, UpdateShareRequest};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_login_share_anonymous_download() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 10_000).await;
    let mut session = app.login_user("alice", "correct horse").await;
    let ctx = app.ctx(&mut session);

    let file = app.upload(&ctx, "minutes.txt", 64).await.unwrap();
    let link = app
        .shares
        .create(
            &ctx,
            file.id,
            ShareOptions {
                password: Some("s3cret-share".to_string()),
                max_downloads: Some(2),
                ..ShareOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(link.url.starts_with("http://localhost/s?token="));

    let err = app.files.download_shared(&link.token, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PasswordRequired);
    assert_eq!(err.public_message(), "password_required");

    let err = app
        .files
        .download_shared(&link.token, Some("guess"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidPassword);

    let (download, data) = app
        .files
        .download_shared(&link.token, Some("s3cret-share"))
        .await
        .unwrap();
    assert_eq!(download.file.id, file.id);
    assert_eq!(data.len(), 64);
    assert_eq!(download.share.download_count, 1);

    // Protected shares never appear in the public listing.
    assert!(app.shares.list_public().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_downloads_never_exceed_cap() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 10_000).await;
    let mut session = app.login_user("alice", "correct horse").await;
    let ctx = app.ctx(&mut session);

    let file = app.upload(&ctx, "slides.pdf", 10).await.unwrap();
    let link = app
        .shares
        .create(
            &ctx,
            file.id,
            ShareOptions {
                max_downloads: Some(4),
                ..ShareOptions::default()
            },
        )
        .await
        .unwrap();

    let results = join_all((0..16).map(|_| app.shares.redeem(&link.token, None))).await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);

    let mine = app.shares.list_my(&ctx).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].download_count, 4);
}

#[tokio::test]
async fn test_expired_share_reports_expiry() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 10_000).await;
    let mut session = app.login_user("alice", "correct horse").await;
    let ctx = app.ctx(&mut session);

    let file = app.upload(&ctx, "a.txt", 1).await.unwrap();
    let link = app
        .shares
        .create(&ctx, file.id, ShareOptions::default())
        .await
        .unwrap();

    app.shares
        .update(
            &ctx,
            link.share_id,
            UpdateShareRequest {
                password: Some("late-password".to_string()),
                expires_at: Some(Some(Utc::now() - Duration::seconds(1))),
                ..UpdateShareRequest::default()
            },
        )
        .await
        .unwrap();

    let err = app.shares.validate(&link.token, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyExpired);
}

#[tokio::test]
async fn test_admin_manages_any_share() {
    let app = TestApp::new();
    app.create_user("alice", "correct horse", Role::User, 10_000).await;
    app.create_user("root", "admin horse", Role::Admin, 10_000).await;
    let mut alice_session = app.login_user("alice", "correct horse").await;
    let mut admin_session = app.login_user("root", "admin horse").await;
    let alice = app.ctx(&mut alice_session);
    let admin = app.ctx(&mut admin_session);

    let file = app.upload(&alice, "a.txt", 1).await.unwrap();
    let link = app
        .shares
        .create(&alice, file.id, ShareOptions::default())
        .await
        .unwrap();

    assert_eq!(app.shares.list_all(&admin).await.unwrap().len(), 1);
    app.shares.deactivate(&admin, link.share_id).await.unwrap();

    let err = app.shares.validate(&link.token, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Deactivated);
}
