pub mod seed;
pub mod sqlite;

pub use sqlite::SqliteRoleStore;

use async_trait::async_trait;

use crate::editor::PermissionSet;
use crate::error::AuthError;
use crate::guard::Subject;
use crate::types::*;

/// Persistence for roles, their held permission sets and user assignments.
///
/// The engine never talks to a store; callers fetch a held set, evaluate or
/// edit it in memory, and hand the result back.
#[async_trait]
pub trait RoleStore: Send + Sync {
    // Roles
    async fn create_role(
        &self,
        name: &str,
        description: &str,
        is_system: bool,
        permissions: &PermissionSet,
    ) -> Result<Role, AuthError>;
    async fn get_role(&self, id: &str) -> Result<Role, AuthError>;
    async fn get_role_by_name(&self, name: &str) -> Result<Role, AuthError>;
    async fn list_roles(&self) -> Result<Vec<Role>, AuthError>;
    /// Replace the held set of a role.
    async fn set_role_permissions(
        &self,
        id: &str,
        permissions: &PermissionSet,
    ) -> Result<Role, AuthError>;
    async fn delete_role(&self, id: &str) -> Result<(), AuthError>;

    // Users
    async fn create_user(&self, username: &str, email: Option<&str>) -> Result<User, AuthError>;
    async fn get_user(&self, id: &str) -> Result<User, AuthError>;
    async fn get_user_by_username(&self, username: &str) -> Result<User, AuthError>;
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    // User-Role
    async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<(), AuthError>;
    async fn unassign_role(&self, user_id: &str, role_id: &str) -> Result<(), AuthError>;
    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<Role>, AuthError>;
    /// Union of the held sets of every role assigned to the user.
    async fn get_user_permissions(&self, user_id: &str) -> Result<PermissionSet, AuthError>;

    // Lifecycle
    async fn migrate(&self) -> Result<(), AuthError>;
    async fn seed_defaults(&self) -> Result<(), AuthError>;

    /// Toggle one permission string on a role and persist the result.
    ///
    /// The default reads then writes; stores shared across tasks override it
    /// so the read and the write happen atomically.
    async fn toggle_role_permission(&self, id: &str, permission: &str) -> Result<Role, AuthError> {
        let role = self.get_role(id).await?;
        let next = role.permissions.toggled(permission);
        self.set_role_permissions(id, &next).await
    }

    async fn subject(&self, user_id: &str) -> Result<Subject, AuthError> {
        let user = self.get_user(user_id).await?;
        let roles = self
            .list_user_roles(user_id)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();
        let permissions = self.get_user_permissions(user_id).await?;
        Ok(Subject {
            id: user.id,
            name: user.username,
            roles,
            permissions,
        })
    }
}
