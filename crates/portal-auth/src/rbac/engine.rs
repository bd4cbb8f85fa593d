//! RBAC evaluation: role permissions plus ownership-scoped resource checks.

use std::sync::Arc;

use portal_core::error::AppError;
use portal_core::result::AppResult;
use portal_entity::principal::{PrincipalRef, ResourceOwner};
use portal_entity::user::Role;

use super::policies::{Permission, RbacPolicies};

/// Action on an owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAction {
    /// Read or download.
    View,
    /// Modify metadata.
    Edit,
    /// Remove.
    Delete,
    /// Create or manage share links.
    Share,
}

impl ResourceAction {
    /// The (own, all) permission pair governing this action.
    pub fn permissions(&self) -> (Permission, Permission) {
        match self {
            Self::View => (Permission::FilesViewOwn, Permission::FilesViewAll),
            Self::Edit => (Permission::FilesEditOwn, Permission::FilesEditAll),
            Self::Delete => (Permission::FilesDeleteOwn, Permission::FilesDeleteAll),
            Self::Share => (Permission::FilesShare, Permission::FilesShareAll),
        }
    }

    /// The action a resource-scoped permission refers to, if any.
    pub fn of(permission: Permission) -> Option<Self> {
        match permission {
            Permission::FilesViewOwn | Permission::FilesViewAll => Some(Self::View),
            Permission::FilesEditOwn | Permission::FilesEditAll => Some(Self::Edit),
            Permission::FilesDeleteOwn | Permission::FilesDeleteAll => Some(Self::Delete),
            Permission::FilesShare | Permission::FilesShareAll => Some(Self::Share),
            _ => None,
        }
    }
}

/// Stateless policy evaluator shared by every file and share operation.
#[derive(Debug, Clone)]
pub struct RbacEngine {
    /// The policy table.
    policies: Arc<RbacPolicies>,
}

impl RbacEngine {
    /// Creates an engine with the default policy table.
    pub fn new() -> Self {
        Self::with_policies(Arc::new(RbacPolicies::new()))
    }

    /// Creates an engine sharing an existing policy table.
    pub fn with_policies(policies: Arc<RbacPolicies>) -> Self {
        Self { policies }
    }

    /// Effective role of an optional principal.
    pub fn role_of(principal: Option<&PrincipalRef>) -> Role {
        principal.map(|p| p.role).unwrap_or(Role::Anonymous)
    }

    /// Checks whether the role has the permission.
    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.policies.has_permission(&role, &permission)
    }

    /// Decide whether `principal` may exercise `permission`.
    ///
    /// Without a resource this is a table lookup. With a resource, a
    /// resource-scoped permission is widened to its action: the `.all`
    /// permission allows unconditionally, the `.own` permission allows only
    /// when the principal owns the resource.
    pub fn can(
        &self,
        principal: Option<&PrincipalRef>,
        permission: Permission,
        resource: Option<&ResourceOwner>,
    ) -> bool {
        match (resource, ResourceAction::of(permission)) {
            (Some(owner), Some(action)) => self.can_access(principal, action, owner),
            _ => self.has_permission(Self::role_of(principal), permission),
        }
    }

    /// Like [`can`](Self::can) but yields `PermissionDenied`.
    pub fn require(
        &self,
        principal: Option<&PrincipalRef>,
        permission: Permission,
        resource: Option<&ResourceOwner>,
    ) -> AppResult<()> {
        if self.can(principal, permission, resource) {
            Ok(())
        } else {
            let role = Self::role_of(principal);
            Err(AppError::permission_denied(format!(
                "Role '{role}' may not '{permission}' this resource"
            )))
        }
    }

    /// Ownership-aware check for one action on one resource.
    pub fn can_access(
        &self,
        principal: Option<&PrincipalRef>,
        action: ResourceAction,
        owner: &ResourceOwner,
    ) -> bool {
        let Some(principal) = principal else {
            return false;
        };
        let (own, all) = action.permissions();
        if self.has_permission(principal.role, all) {
            return true;
        }
        self.has_permission(principal.role, own) && principal.owns(owner)
    }

    /// Whether the principal may view the resource.
    pub fn can_view(&self, principal: Option<&PrincipalRef>, owner: &ResourceOwner) -> bool {
        self.can_access(principal, ResourceAction::View, owner)
    }

    /// Whether the principal may edit the resource.
    pub fn can_edit(&self, principal: Option<&PrincipalRef>, owner: &ResourceOwner) -> bool {
        self.can_access(principal, ResourceAction::Edit, owner)
    }

    /// Whether the principal may delete the resource.
    pub fn can_delete(&self, principal: Option<&PrincipalRef>, owner: &ResourceOwner) -> bool {
        self.can_access(principal, ResourceAction::Delete, owner)
    }

    /// Whether the principal may share the resource.
    pub fn can_share(&self, principal: Option<&PrincipalRef>, owner: &ResourceOwner) -> bool {
        self.can_access(principal, ResourceAction::Share, owner)
    }
}

impl Default for RbacEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_entity::principal::PrincipalKind;
    use uuid::Uuid;

    fn principal(label: &str, role: Role) -> PrincipalRef {
        PrincipalRef {
            kind: PrincipalKind::User,
            id: Uuid::new_v4(),
            label: label.to_string(),
            role,
        }
    }

    #[test]
    fn test_user_cannot_delete_another_users_file() {
        let engine = RbacEngine::new();
        let bob = principal("bob", Role::User);
        let carol = principal("carol", Role::User);
        let admin = principal("root", Role::Admin);
        let carols_file = ResourceOwner::user(carol.id);

        assert!(!engine.can(Some(&bob), Permission::FilesDeleteOwn, Some(&carols_file)));
        assert!(engine.can(Some(&carol), Permission::FilesDeleteOwn, Some(&carols_file)));
        assert!(engine.can(Some(&admin), Permission::FilesDeleteOwn, Some(&carols_file)));
        assert!(engine
            .require(Some(&bob), Permission::FilesDeleteAll, Some(&carols_file))
            .is_err());
    }

    #[test]
    fn test_anonymous_only_downloads_shared() {
        let engine = RbacEngine::new();
        assert!(engine.can(None, Permission::FilesDownloadShared, None));
        assert!(!engine.can(None, Permission::FilesUpload, None));
        assert!(!engine.can_view(None, &ResourceOwner::user(Uuid::new_v4())));
    }

    #[test]
    fn test_access_code_owns_by_code_id() {
        let engine = RbacEngine::new();
        let code = PrincipalRef {
            kind: PrincipalKind::AccessCode,
            id: Uuid::new_v4(),
            label: "code-1234abcd".to_string(),
            role: Role::User,
        };
        assert!(engine.can_delete(Some(&code), &ResourceOwner::code(code.id)));
        assert!(!engine.can_delete(Some(&code), &ResourceOwner::user(code.id)));
        assert!(!engine.can(Some(&code), Permission::AdminAccess, None));
    }

    #[test]
    fn test_admin_only_permissions() {
        let engine = RbacEngine::new();
        let user = principal("bob", Role::User);
        let admin = principal("root", Role::Admin);
        for perm in [
            Permission::UsersView,
            Permission::UsersCreate,
            Permission::SettingsManage,
            Permission::FilesShareAll,
        ] {
            assert!(!engine.can(Some(&user), perm, None));
            assert!(engine.can(Some(&admin), perm, None));
        }
    }
}
