use anyhow::{Context as _, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use gatehouse_auth::store::RoleStore;
use gatehouse_auth::{AuthError, User, group_by_module, permission_label};

use super::Context;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List users
    List,
    /// Create a user
    Create {
        username: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Assign a role to a user
    Assign { username: String, role: String },
    /// Remove a role from a user
    Unassign { username: String, role: String },
    /// Show a user's effective permissions, grouped by module
    Permissions { username: String },
    /// Import user records exported by the backend (JSON array)
    Import { file: PathBuf },
}

pub async fn run(base_dir: &Path, command: &UserCommand, json: bool) -> Result<()> {
    let ctx = Context::open(base_dir).await?;
    let store = &ctx.store;

    match command {
        UserCommand::List => {
            let users = store.list_users().await?;
            if json {
                return super::print_json(&users);
            }
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            println!("{:<20} {:<28} {}", "USERNAME", "EMAIL", "ROLES");
            println!("{}", "-".repeat(72));
            for u in &users {
                let roles: Vec<String> = store
                    .list_user_roles(&u.id)
                    .await?
                    .into_iter()
                    .map(|r| r.name)
                    .collect();
                println!(
                    "{:<20} {:<28} {}",
                    u.username,
                    u.email.as_deref().unwrap_or("-"),
                    roles.join(", ")
                );
            }
        }
        UserCommand::Create { username, email } => {
            let user = store.create_user(username, email.as_deref()).await?;
            if json {
                return super::print_json(&user);
            }
            println!("Created user {} ({})", user.username, user.id);
        }
        UserCommand::Assign { username, role } => {
            let user = store.get_user_by_username(username).await?;
            let role = store.get_role_by_name(role).await?;
            store.assign_role(&user.id, &role.id).await?;
            println!("Assigned {} to {}", role.name, user.username);
        }
        UserCommand::Unassign { username, role } => {
            let user = store.get_user_by_username(username).await?;
            let role = store.get_role_by_name(role).await?;
            store.unassign_role(&user.id, &role.id).await?;
            println!("Removed {} from {}", role.name, user.username);
        }
        UserCommand::Permissions { username } => {
            let user = store.get_user_by_username(username).await?;
            let subject = store.subject(&user.id).await?;
            let groups = group_by_module(&subject.permissions);
            if json {
                return super::print_json(&serde_json::json!({
                    "user": subject.name,
                    "roles": subject.roles,
                    "permissions": groups,
                }));
            }
            println!("{} (roles: {})", subject.name, subject.roles.join(", "));
            for (module, perms) in groups.iter() {
                println!("  {module}");
                for p in perms {
                    println!("    {:<32} {}", p, permission_label(p));
                }
            }
        }
        UserCommand::Import { file } => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let records: Vec<serde_json::Value> = serde_json::from_str(&content)?;
            let mut created = 0usize;
            for record in &records {
                let upstream = User::from_upstream(record)?;
                match store.get_user_by_username(&upstream.username).await {
                    Ok(_) => {}
                    Err(AuthError::NotFound(_)) => {
                        store
                            .create_user(&upstream.username, upstream.email.as_deref())
                            .await?;
                        created += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            println!("Imported {} users ({created} new)", records.len());
        }
    }

    Ok(())
}
