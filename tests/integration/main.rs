//! End-to-end flows across auth, session, share and file services.

mod helpers;

mod auth_test;
mod file_test;
mod permission_test;
mod share_test;
