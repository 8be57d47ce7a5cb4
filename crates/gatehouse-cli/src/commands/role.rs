use anyhow::{Context as _, Result, bail};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use gatehouse_auth::catalog::describe;
use gatehouse_auth::store::RoleStore;
use gatehouse_auth::{AuthError, PermissionSet, Role, permission_label};

use super::Context;

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    /// List roles
    List,
    /// Show a role's held permissions
    Show { name: String },
    /// Create a role
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated initial permissions
        #[arg(long, value_delimiter = ',')]
        permissions: Vec<String>,
    },
    /// Delete a role
    Delete { name: String },
    /// Toggle one permission on a role
    Toggle { name: String, permission: String },
    /// Toggle `<module>.*` on a role
    ModuleToggle { name: String, module: String },
    /// Toggle `<module>.<submodule>.*` on a role
    SubmoduleToggle {
        name: String,
        module: String,
        submodule: String,
    },
    /// Import role records exported by the backend (JSON array)
    Import { file: PathBuf },
}

fn print_role(role: &Role) {
    println!("{} ({})", role.name, role.id);
    if !role.description.is_empty() {
        println!("  {}", role.description);
    }
    if role.is_system {
        println!("  system role");
    }
    for p in role.permissions.iter() {
        println!(
            "  {:<32} {:<24} {}",
            p,
            permission_label(p),
            describe(p).unwrap_or("")
        );
    }
}

fn report_toggle(role: &Role, permission: &str, json: bool) -> Result<()> {
    if json {
        return super::print_json(role);
    }
    let verb = if role.permissions.contains(permission) {
        "granted"
    } else {
        "revoked"
    };
    println!("{verb} {permission} on {}", role.name);
    Ok(())
}

/// The broadest held wildcard that covers `permission`; `None` when nothing does.
fn covering_wildcard(held: &PermissionSet, permission: &str) -> Option<String> {
    let parts: Vec<&str> = permission.split('.').collect();
    (1..parts.len())
        .map(|depth| format!("{}.*", parts[..depth].join(".")))
        .find(|wildcard| held.contains(wildcard))
}

/// Upsert role records by name. Every record is parsed before anything is
/// written. An existing role keeps its held set when the record has no
/// permission field. Returns `(created, updated)`.
async fn import_roles(
    store: &dyn RoleStore,
    records: &[serde_json::Value],
) -> Result<(usize, usize)> {
    let parsed = records
        .iter()
        .map(|record| Ok((Role::from_upstream(record)?, Role::upstream_permissions(record)?)))
        .collect::<Result<Vec<_>, AuthError>>()?;

    let (mut created, mut updated) = (0usize, 0usize);
    for (upstream, permissions) in &parsed {
        match store.get_role_by_name(&upstream.name).await {
            Ok(existing) => {
                if let Some(permissions) = permissions {
                    store.set_role_permissions(&existing.id, permissions).await?;
                    updated += 1;
                } else {
                    tracing::debug!(role = %upstream.name, "record has no permissions, kept as is");
                }
            }
            Err(AuthError::NotFound(_)) => {
                store
                    .create_role(
                        &upstream.name,
                        &upstream.description,
                        upstream.is_system,
                        &upstream.permissions,
                    )
                    .await?;
                created += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok((created, updated))
}

pub async fn run(base_dir: &Path, command: &RoleCommand, json: bool) -> Result<()> {
    let ctx = Context::open(base_dir).await?;
    let store = &ctx.store;

    match command {
        RoleCommand::List => {
            let roles = store.list_roles().await?;
            if json {
                return super::print_json(&roles);
            }
            if roles.is_empty() {
                println!("No roles found. Run `gatehouse init` to seed the defaults.");
                return Ok(());
            }
            println!("{:<16} {:<8} {:>6} {}", "NAME", "SYSTEM", "PERMS", "DESCRIPTION");
            println!("{}", "-".repeat(72));
            for r in &roles {
                println!(
                    "{:<16} {:<8} {:>6} {}",
                    r.name,
                    if r.is_system { "yes" } else { "no" },
                    r.permissions.len(),
                    r.description
                );
            }
        }
        RoleCommand::Show { name } => {
            let role = store.get_role_by_name(name).await?;
            if json {
                return super::print_json(&role);
            }
            print_role(&role);
            let orphans = ctx.config.matrix()?.orphaned(&role.permissions);
            if !orphans.is_empty() {
                println!("  not in matrix: {}", orphans.join(", "));
            }
        }
        RoleCommand::Create {
            name,
            description,
            permissions,
        } => {
            let permissions: PermissionSet = permissions.iter().map(|p| p.trim()).collect();
            let role = store
                .create_role(name, description, false, &permissions)
                .await?;
            if json {
                return super::print_json(&role);
            }
            println!("Created role {} ({})", role.name, role.id);
        }
        RoleCommand::Delete { name } => {
            let role = store.get_role_by_name(name).await?;
            store.delete_role(&role.id).await?;
            println!("Deleted role {}", role.name);
        }
        RoleCommand::Toggle { name, permission } => {
            let role = store.get_role_by_name(name).await?;
            if !gatehouse_auth::permissions::is_wildcard(permission) {
                if let Some(wildcard) = covering_wildcard(&role.permissions, permission) {
                    bail!(
                        "{permission} is locked by {wildcard} on role {name}; \
                         toggle the wildcard instead"
                    );
                }
            }
            let role = store.toggle_role_permission(&role.id, permission).await?;
            report_toggle(&role, permission, json)?;
        }
        RoleCommand::ModuleToggle { name, module } => {
            if !ctx.config.matrix()?.modules.iter().any(|m| m == module) {
                tracing::warn!(module = %module, "module is not part of the permission matrix");
            }
            let wildcard = gatehouse_auth::matrix::module_wildcard(module);
            let role = store.get_role_by_name(name).await?;
            let role = store.toggle_role_permission(&role.id, &wildcard).await?;
            report_toggle(&role, &wildcard, json)?;
        }
        RoleCommand::SubmoduleToggle {
            name,
            module,
            submodule,
        } => {
            let view = ctx.config.matrix()?.module_view(module);
            if view.submodule(submodule).is_none() {
                tracing::warn!(
                    module = %module,
                    submodule = %submodule,
                    "submodule is not part of the permission matrix"
                );
            }
            let wildcard = gatehouse_auth::matrix::submodule_wildcard(module, submodule);
            let role = store.get_role_by_name(name).await?;
            let role = store.toggle_role_permission(&role.id, &wildcard).await?;
            report_toggle(&role, &wildcard, json)?;
        }
        RoleCommand::Import { file } => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let records: Vec<serde_json::Value> = serde_json::from_str(&content)?;
            let (created, updated) = import_roles(store, &records).await?;
            println!(
                "Imported {} roles ({created} created, {updated} updated)",
                records.len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_auth::SqliteRoleStore;
    use serde_json::json;

    #[test]
    fn covering_wildcard_prefers_module() {
        let held: PermissionSet = ["content.*", "content.media.*"].into_iter().collect();
        assert_eq!(
            covering_wildcard(&held, "content.media.view").as_deref(),
            Some("content.*")
        );
    }

    #[test]
    fn covering_wildcard_for_submodule_entry() {
        let held: PermissionSet = ["security.email.*"].into_iter().collect();
        assert_eq!(
            covering_wildcard(&held, "security.email.edit").as_deref(),
            Some("security.email.*")
        );
        assert_eq!(covering_wildcard(&held, "security.password.edit"), None);
        assert_eq!(covering_wildcard(&held, "profile.view"), None);
    }

    #[test]
    fn covering_wildcard_reaches_deeper_paths() {
        let held: PermissionSet = ["content.media.*"].into_iter().collect();
        assert_eq!(
            covering_wildcard(&held, "content.media.albums.view").as_deref(),
            Some("content.media.*")
        );
        let held: PermissionSet = ["content.media.albums.*"].into_iter().collect();
        assert_eq!(
            covering_wildcard(&held, "content.media.albums.view").as_deref(),
            Some("content.media.albums.*")
        );
        assert_eq!(covering_wildcard(&held, "content.media.view"), None);
    }

    async fn seeded() -> SqliteRoleStore {
        let store = SqliteRoleStore::open_in_memory().unwrap();
        store.migrate().await.unwrap();
        store.seed_defaults().await.unwrap();
        store
    }

    #[tokio::test]
    async fn import_rejects_comma_string_permissions() {
        let store = seeded().await;
        let before = store.get_role_by_name("editor").await.unwrap().permissions;
        let records = vec![
            json!({"id": "r-1", "name": "support", "permissions": ["contacts.*"]}),
            json!({"id": "r-2", "name": "editor", "permissions": "content.*,contacts.view"}),
        ];
        assert!(import_roles(&store, &records).await.is_err());
        assert_eq!(
            store.get_role_by_name("editor").await.unwrap().permissions,
            before
        );
        assert!(store.get_role_by_name("support").await.is_err());
    }

    #[tokio::test]
    async fn import_without_permissions_keeps_held_set() {
        let store = seeded().await;
        let before = store.get_role_by_name("editor").await.unwrap().permissions;
        assert!(!before.is_empty());
        let records = vec![json!({"id": "r-2", "name": "editor"})];
        let (created, updated) = import_roles(&store, &records).await.unwrap();
        assert_eq!((created, updated), (0, 0));
        assert_eq!(
            store.get_role_by_name("editor").await.unwrap().permissions,
            before
        );
    }

    #[tokio::test]
    async fn import_creates_and_replaces() {
        let store = seeded().await;
        let records = vec![
            json!({"_id": "r-1", "Name": "support", "perms": ["contacts.*"]}),
            json!({"id": "r-2", "name": "editor", "permissions": ["content.view"]}),
        ];
        let (created, updated) = import_roles(&store, &records).await.unwrap();
        assert_eq!((created, updated), (1, 1));
        let support = store.get_role_by_name("support").await.unwrap();
        assert!(support.permissions.contains("contacts.*"));
        let editor = store.get_role_by_name("editor").await.unwrap();
        assert_eq!(editor.permissions.to_vec(), vec!["content.view"]);
    }
}
