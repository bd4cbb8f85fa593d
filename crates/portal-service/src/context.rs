//! Request context carrying the session principal and client address.

use std::net::IpAddr;

use chrono::{DateTime, Utc};

use portal_auth::session::SessionStatus;
use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_entity::principal::PrincipalRef;
use portal_entity::user::Role;

/// Context for the current request.
///
/// Built by the transport after checking the session and passed into
/// service methods so that every operation knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The bound principal, `None` for anonymous requests.
    pub principal: Option<PrincipalRef>,
    /// Address of the request origin.
    pub client_address: IpAddr,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an authenticated principal.
    pub fn authenticated(principal: PrincipalRef, client_address: IpAddr) -> Self {
        Self {
            principal: Some(principal),
            client_address,
            request_time: Utc::now(),
        }
    }

    /// Context with no principal.
    pub fn anonymous(client_address: IpAddr) -> Self {
        Self {
            principal: None,
            client_address,
            request_time: Utc::now(),
        }
    }

    /// Context derived from a session check.
    pub fn from_status(status: &SessionStatus, client_address: IpAddr) -> Self {
        match status.principal() {
            Some(principal) => Self::authenticated(principal.clone(), client_address),
            None => Self::anonymous(client_address),
        }
    }

    /// The principal as an option reference, for RBAC calls.
    pub fn principal(&self) -> Option<&PrincipalRef> {
        self.principal.as_ref()
    }

    /// The principal, or `PermissionDenied` for anonymous requests.
    pub fn require_principal(&self) -> AppResult<&PrincipalRef> {
        self.principal
            .as_ref()
            .ok_or_else(|| AppError::permission_denied("Login required"))
    }

    /// Returns whether the current principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.principal.as_ref().is_some_and(|p| p.role == Role::Admin)
    }
}
