use anyhow::Result;
use std::path::Path;

use gatehouse_auth::store::RoleStore;
use gatehouse_auth::{GatehouseConfig, SqliteRoleStore};

pub async fn run(base_dir: &Path) -> Result<()> {
    println!("Initializing gatehouse in {}", base_dir.display());

    std::fs::create_dir_all(base_dir)?;

    let config_path = GatehouseConfig::default_path(base_dir);
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = GatehouseConfig::default_config(base_dir);
        config.save(&config_path)?;
        println!("Created config: {}", config_path.display());
    }

    let config = GatehouseConfig::load(&config_path)?;

    // Fail early on a broken matrix file rather than on first use.
    let matrix = config.matrix()?;
    println!(
        "Permission matrix: {} modules, {} permissions ({})",
        matrix.modules.len(),
        matrix.permissions.len(),
        config.gatehouse.matrix_path.as_deref().unwrap_or("built-in"),
    );

    let store = SqliteRoleStore::open(&config.gatehouse.db_path)?;
    store.migrate().await?;
    println!("Initialized role store: {}", config.gatehouse.db_path);

    if config.gatehouse.seed_roles {
        store.seed_defaults().await?;
        let roles = store.list_roles().await?;
        println!("Roles: {}", roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", "));
    }

    println!("\ngatehouse initialized. Next steps:");
    println!("  1. Point matrix_path in {} at your backend's matrix", config_path.display());
    println!("  2. Run `gatehouse matrix --role editor` to inspect a role");

    Ok(())
}
