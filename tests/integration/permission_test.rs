//! Ownership-scoped permission checks across services.

use portal_auth::rbac::{Permission, RbacEngine};
use portal_core::error::ErrorKind;
use portal_entity::user::Role;
use portal_service::RequestContext;
use portal_service::share::ShareOptions;

use crate::helpers::{CLIENT, TestApp};

#[tokio::test]
async fn test_bob_cannot_touch_carols_file() {
    let app = TestApp::new();
    app.create_user("bob", "bob password", Role::User, 1000).await;
    app.create_user("carol", "carol password", Role::User, 1000).await;
    app.create_user("root", "admin password", Role::Admin, 1000).await;

    let mut bob_session = app.login_user("bob", "bob password").await;
    let mut carol_session = app.login_user("carol", "carol password").await;
    let mut admin_session = app.login_user("root", "admin password").await;
    let bob = app.ctx(&mut bob_session);
    let carol = app.ctx(&mut carol_session);
    let admin = app.ctx(&mut admin_session);

    let file = app.upload(&carol, "carol.txt", 10).await.unwrap();
    let rbac = RbacEngine::new();
    assert!(!rbac.can(bob.principal(), Permission::FilesDeleteOwn, Some(&file.owner())));
    assert!(rbac.can(admin.principal(), Permission::FilesDeleteOwn, Some(&file.owner())));

    let err = app.files.delete(&bob, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    let err = app
        .shares
        .create(&bob, file.id, ShareOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    app.files.delete(&admin, file.id).await.unwrap();
}

#[tokio::test]
async fn test_anonymous_can_only_download() {
    let app = TestApp::new();
    let anonymous = RequestContext::anonymous(CLIENT);

    let err = app.upload(&anonymous, "x.txt", 1).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    let err = app.shares.list_my(&anonymous).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert!(app.shares.list_public().await.unwrap().is_empty());
}
