pub mod check;
pub mod config;
pub mod expand;
pub mod group;
pub mod init;
pub mod label;
pub mod matrix;
pub mod role;
pub mod tabs;
pub mod user;

use anyhow::{Result, bail};
use clap::Args;
use std::path::Path;

use gatehouse_auth::store::RoleStore;
use gatehouse_auth::{GatehouseConfig, PermissionSet, SqliteRoleStore};

/// Where a held permission set comes from.
#[derive(Args, Debug, Default)]
pub struct HeldSource {
    /// Use the permissions of this role
    #[arg(long, conflicts_with_all = ["user", "held"])]
    pub role: Option<String>,
    /// Use the merged permissions of this user's roles
    #[arg(long, conflicts_with = "held")]
    pub user: Option<String>,
    /// Comma-separated permissions to evaluate directly
    #[arg(long, value_delimiter = ',')]
    pub held: Option<Vec<String>>,
}

pub struct Context {
    pub config: GatehouseConfig,
    pub store: SqliteRoleStore,
}

impl Context {
    pub async fn open(base_dir: &Path) -> Result<Self> {
        let config_path = GatehouseConfig::default_path(base_dir);
        let config = GatehouseConfig::load(&config_path)?;
        let store = SqliteRoleStore::open(&config.gatehouse.db_path)?;
        store.migrate().await?;
        Ok(Self { config, store })
    }

    pub async fn role_permissions(&self, role: &str) -> Result<PermissionSet> {
        Ok(self.store.get_role_by_name(role).await?.permissions)
    }

    pub async fn user_permissions(&self, username: &str) -> Result<PermissionSet> {
        let user = self.store.get_user_by_username(username).await?;
        Ok(self.store.get_user_permissions(&user.id).await?)
    }
}

/// Resolve a held set. Inline `--held` lists need no config or store.
pub async fn resolve_held(base_dir: &Path, source: &HeldSource) -> Result<PermissionSet> {
    if let Some(ref held) = source.held {
        return Ok(held.iter().map(|p| p.trim()).filter(|p| !p.is_empty()).collect());
    }
    let ctx = Context::open(base_dir).await?;
    match (&source.role, &source.user) {
        (Some(role), _) => ctx.role_permissions(role).await,
        (None, Some(user)) => ctx.user_permissions(user).await,
        (None, None) => bail!("one of --role, --user or --held is required"),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inline_held_needs_no_store() {
        let source = HeldSource {
            held: Some(vec!["content.*".into(), " ".into(), " users.view".into()]),
            ..Default::default()
        };
        let held = resolve_held(Path::new("/nonexistent"), &source).await.unwrap();
        assert_eq!(held.to_vec(), vec!["content.*", "users.view"]);
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = GatehouseConfig::default_config(tmp.path());
        config.save(&GatehouseConfig::default_path(tmp.path())).unwrap();
        let err = resolve_held(tmp.path(), &HeldSource::default()).await.unwrap_err();
        assert!(err.to_string().contains("--role"));
    }
}
