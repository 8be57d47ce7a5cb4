use crate::catalog::builtin_matrix;
use crate::error::{AuthError, Result};
use crate::matrix::PermissionMatrix;
use crate::permissions::DEFAULT_ACTIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level gatehouse configuration stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatehouseConfig {
    pub gatehouse: GatehouseSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatehouseSettings {
    /// Path to the SQLite role store.
    pub db_path: String,
    /// Permission matrix JSON. The built-in catalog is used when unset.
    #[serde(default)]
    pub matrix_path: Option<String>,
    /// Actions `expand` uses when none are given.
    #[serde(default = "default_actions")]
    pub default_actions: Vec<String>,
    /// Seed the default roles on `init`.
    #[serde(default = "default_seed_roles")]
    pub seed_roles: bool,
}

fn default_actions() -> Vec<String> {
    DEFAULT_ACTIONS.iter().map(|a| a.to_string()).collect()
}

fn default_seed_roles() -> bool {
    true
}

impl GatehouseConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuthError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AuthError::TomlDe(e.to_string()))
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AuthError::TomlSer(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config for `gatehouse init`.
    pub fn default_config(base_dir: &Path) -> Self {
        Self {
            gatehouse: GatehouseSettings {
                db_path: base_dir.join("gatehouse.db").display().to_string(),
                matrix_path: None,
                default_actions: default_actions(),
                seed_roles: true,
            },
        }
    }

    /// Resolve the config file path: `<base_dir>/gatehouse.toml`
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join("gatehouse.toml")
    }

    /// Resolve the default gatehouse home directory: `~/.gatehouse`
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".gatehouse"))
            .ok_or_else(|| AuthError::Config("Cannot determine home directory".to_string()))
    }

    /// The configured matrix, or the built-in catalog.
    pub fn matrix(&self) -> Result<PermissionMatrix> {
        match self.gatehouse.matrix_path {
            Some(ref path) => PermissionMatrix::load(Path::new(path)),
            None => Ok(builtin_matrix()),
        }
    }
}
