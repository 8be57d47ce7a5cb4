use crate::catalog::DEFAULT_ROLES;
use crate::editor::PermissionSet;
use crate::error::AuthError;
use crate::store::RoleStore;

/// Create the built-in system roles. Roles that already exist keep their current
/// permissions.
pub async fn seed_defaults(store: &dyn RoleStore) -> Result<(), AuthError> {
    let mut created = 0usize;
    for role in DEFAULT_ROLES {
        match store.get_role_by_name(role.name).await {
            Ok(_) => continue,
            Err(AuthError::NotFound(_)) => {
                let permissions: PermissionSet = role.permissions.iter().copied().collect();
                store
                    .create_role(role.name, role.description, true, &permissions)
                    .await?;
                created += 1;
            }
            Err(e) => return Err(e),
        }
    }
    tracing::info!(created, total = DEFAULT_ROLES.len(), "seeded default roles");
    Ok(())
}
