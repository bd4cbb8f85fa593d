//! Principal model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access_code::AccessCode;
use crate::user::{Role, UserAccount};

/// The full record of whoever authenticated.
#[derive(Debug, Clone)]
pub enum Principal {
    /// A username/password login.
    User(UserAccount),
    /// An access-code login.
    AccessCode(AccessCode),
}

impl Principal {
    /// Database identifier of the underlying record.
    pub fn id(&self) -> Uuid {
        match self {
            Self::User(user) => user.id,
            Self::AccessCode(code) => code.id,
        }
    }

    /// Effective role. Access codes always act as plain users.
    pub fn role(&self) -> Role {
        match self {
            Self::User(user) => user.role,
            Self::AccessCode(_) => Role::User,
        }
    }

    /// Lightweight reference stored in a session.
    pub fn to_ref(&self) -> PrincipalRef {
        match self {
            Self::User(user) => PrincipalRef {
                kind: PrincipalKind::User,
                id: user.id,
                label: user.username.clone(),
                role: user.role,
            },
            Self::AccessCode(code) => PrincipalRef {
                kind: PrincipalKind::AccessCode,
                id: code.id,
                label: code.label(),
                role: Role::User,
            },
        }
    }
}

/// Which table a principal id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// Row in `users`.
    User,
    /// Row in `access_codes`.
    AccessCode,
}

/// What a session remembers about its principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRef {
    /// Record kind.
    pub kind: PrincipalKind,
    /// Record id.
    pub id: Uuid,
    /// Username, or a non-secret label for access codes.
    pub label: String,
    /// Effective role.
    pub role: Role,
}

impl PrincipalRef {
    /// Whether this principal is a user account.
    pub fn is_user(&self) -> bool {
        self.kind == PrincipalKind::User
    }

    /// The account id, if this is a user account.
    pub fn user_id(&self) -> Option<Uuid> {
        self.is_user().then_some(self.id)
    }

    /// Whether this principal owns a resource with the given owner columns.
    ///
    /// Accounts are matched against `user`, access codes against `code`.
    pub fn owns(&self, owner: &ResourceOwner) -> bool {
        match self.kind {
            PrincipalKind::User => owner.user == Some(self.id),
            PrincipalKind::AccessCode => owner.code == Some(self.id),
        }
    }

    /// Owner columns for a resource created by this principal.
    pub fn as_owner(&self) -> ResourceOwner {
        match self.kind {
            PrincipalKind::User => ResourceOwner::user(self.id),
            PrincipalKind::AccessCode => ResourceOwner::code(self.id),
        }
    }
}

/// The owner columns of a file or share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOwner {
    /// Owning account.
    pub user: Option<Uuid>,
    /// Owning access code.
    pub code: Option<Uuid>,
}

impl ResourceOwner {
    /// Resource owned by an account.
    pub fn user(id: Uuid) -> Self {
        Self {
            user: Some(id),
            code: None,
        }
    }

    /// Resource owned by an access code.
    pub fn code(id: Uuid) -> Self {
        Self {
            user: None,
            code: Some(id),
        }
    }
}
