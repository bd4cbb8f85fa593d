//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use portal_core::error::AppError;
use portal_entity::user::Role;

/// A permission checked by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // File operations
    /// View files the principal owns.
    #[serde(rename = "files.view.own")]
    FilesViewOwn,
    /// View any file.
    #[serde(rename = "files.view.all")]
    FilesViewAll,
    /// Upload files.
    #[serde(rename = "files.upload")]
    FilesUpload,
    /// Edit files the principal owns.
    #[serde(rename = "files.edit.own")]
    FilesEditOwn,
    /// Edit any file.
    #[serde(rename = "files.edit.all")]
    FilesEditAll,
    /// Delete files the principal owns.
    #[serde(rename = "files.delete.own")]
    FilesDeleteOwn,
    /// Delete any file.
    #[serde(rename = "files.delete.all")]
    FilesDeleteAll,
    /// Share files the principal owns.
    #[serde(rename = "files.share")]
    FilesShare,
    /// Share or manage shares of any file.
    #[serde(rename = "files.share.all")]
    FilesShareAll,
    /// Download through a share link.
    #[serde(rename = "files.download.shared")]
    FilesDownloadShared,

    // User management
    /// List accounts.
    #[serde(rename = "users.view")]
    UsersView,
    /// Create accounts and access codes.
    #[serde(rename = "users.create")]
    UsersCreate,
    /// Edit accounts.
    #[serde(rename = "users.edit")]
    UsersEdit,
    /// Delete accounts.
    #[serde(rename = "users.delete")]
    UsersDelete,

    // System
    /// Enter the administration area.
    #[serde(rename = "admin.access")]
    AdminAccess,
    /// Change portal settings.
    #[serde(rename = "settings.manage")]
    SettingsManage,
}

impl Permission {
    /// Every permission, in table order.
    pub const ALL: [Permission; 16] = [
        Self::FilesViewOwn,
        Self::FilesViewAll,
        Self::FilesUpload,
        Self::FilesEditOwn,
        Self::FilesEditAll,
        Self::FilesDeleteOwn,
        Self::FilesDeleteAll,
        Self::FilesShare,
        Self::FilesShareAll,
        Self::FilesDownloadShared,
        Self::UsersView,
        Self::UsersCreate,
        Self::UsersEdit,
        Self::UsersDelete,
        Self::AdminAccess,
        Self::SettingsManage,
    ];

    /// Dotted permission name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilesViewOwn => "files.view.own",
            Self::FilesViewAll => "files.view.all",
            Self::FilesUpload => "files.upload",
            Self::FilesEditOwn => "files.edit.own",
            Self::FilesEditAll => "files.edit.all",
            Self::FilesDeleteOwn => "files.delete.own",
            Self::FilesDeleteAll => "files.delete.all",
            Self::FilesShare => "files.share",
            Self::FilesShareAll => "files.share.all",
            Self::FilesDownloadShared => "files.download.shared",
            Self::UsersView => "users.view",
            Self::UsersCreate => "users.create",
            Self::UsersEdit => "users.edit",
            Self::UsersDelete => "users.delete",
            Self::AdminAccess => "admin.access",
            Self::SettingsManage => "settings.manage",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown permission: '{s}'")))
    }
}

/// Defines the mapping from each role to its set of allowed permissions.
///
/// Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    /// Role → set of permissions.
    policies: HashMap<Role, HashSet<Permission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        // Anonymous: share-link downloads only
        let mut anonymous = HashSet::new();
        anonymous.insert(Permission::FilesDownloadShared);
        policies.insert(Role::Anonymous, anonymous);

        // User: own files
        let user: HashSet<Permission> = [
            Permission::FilesViewOwn,
            Permission::FilesUpload,
            Permission::FilesEditOwn,
            Permission::FilesDeleteOwn,
            Permission::FilesShare,
            Permission::FilesDownloadShared,
        ]
        .into_iter()
        .collect();
        policies.insert(Role::User, user);

        // Admin: everything
        let admin: HashSet<Permission> = Permission::ALL.into_iter().collect();
        policies.insert(Role::Admin, admin);

        Self { policies }
    }

    /// Returns the set of permissions for the given role.
    pub fn permissions_for_role(&self, role: &Role) -> HashSet<Permission> {
        self.policies.get(role).cloned().unwrap_or_default()
    }

    /// Checks whether the given role has the specified permission.
    pub fn has_permission(&self, role: &Role, permission: &Permission) -> bool {
        self.policies
            .get(role)
            .map(|perms| perms.contains(permission))
            .unwrap_or(false)
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
