use anyhow::Result;
use std::path::Path;

use gatehouse_auth::GatehouseConfig;

pub fn run(base_dir: &Path) -> Result<()> {
    let config_path = GatehouseConfig::default_path(base_dir);
    let config = GatehouseConfig::load(&config_path)?;

    println!("Config: {}", config_path.display());
    println!();
    println!("  DB path:          {}", config.gatehouse.db_path);
    println!(
        "  Matrix:           {}",
        config.gatehouse.matrix_path.as_deref().unwrap_or("built-in catalog")
    );
    println!("  Default actions:  {}", config.gatehouse.default_actions.join(", "));
    println!("  Seed roles:       {}", config.gatehouse.seed_roles);
    println!();

    let matrix = config.matrix()?;
    let report = matrix.validate();
    println!(
        "  Matrix: {} modules, {} actions, {} permissions",
        matrix.modules.len(),
        matrix.actions.len(),
        matrix.permissions.len()
    );
    if !report.is_clean() {
        println!("  Matrix issues:");
        for p in &report.duplicates {
            println!("    - duplicate: {p}");
        }
        for p in &report.wildcards {
            println!("    - wildcard entry: {p}");
        }
        for p in &report.malformed {
            println!("    - malformed: {p}");
        }
        for m in &report.unknown_modules {
            println!("    - module not listed in modules: {m}");
        }
    }

    Ok(())
}
