pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod guard;
pub mod matrix;
pub mod permissions;
pub mod store;
pub mod types;

pub use config::GatehouseConfig;
pub use editor::{CheckState, ModuleGrid, PermissionSet};
pub use error::AuthError;
pub use guard::{Subject, require_all, require_any, require_permission, visible_tabs};
pub use matrix::{ModuleView, PermissionMatrix};
pub use permissions::{
    Permission, expand_wildcard, expand_wildcard_default, group_by_module, has_all_permissions,
    has_any_permission, has_permission, permission_label,
};
pub use store::{RoleStore, SqliteRoleStore};
pub use types::*;
