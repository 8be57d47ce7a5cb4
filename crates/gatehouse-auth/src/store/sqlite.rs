use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::RoleStore;
use crate::editor::PermissionSet;
use crate::error::AuthError;
use crate::permissions::Permission;
use crate::types::*;

// SQLITE_CONSTRAINT_UNIQUE
const UNIQUE_VIOLATION: i32 = 2067;

pub struct SqliteRoleStore {
    conn: Mutex<Connection>,
}

impl SqliteRoleStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> Result<Self, AuthError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self, AuthError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self::new(conn))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, AuthError> {
        self.conn
            .lock()
            .map_err(|_| AuthError::Internal("role store connection poisoned".into()))
    }
}

const MIGRATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS gh_roles (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    is_system INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gh_role_permissions (
    role_id TEXT NOT NULL REFERENCES gh_roles(id) ON DELETE CASCADE,
    permission TEXT NOT NULL,
    PRIMARY KEY (role_id, permission)
);

CREATE TABLE IF NOT EXISTS gh_users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gh_user_roles (
    user_id TEXT NOT NULL REFERENCES gh_users(id) ON DELETE CASCADE,
    role_id TEXT NOT NULL REFERENCES gh_roles(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, role_id)
);
"#;

const ROLE_COLUMNS: &str = "id, name, description, is_system, created_at, updated_at";
const USER_COLUMNS: &str = "id, username, email, is_active, created_at";

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn duplicate_or_db(e: rusqlite::Error, what: impl FnOnce() -> String) -> AuthError {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        if err.extended_code == UNIQUE_VIOLATION {
            return AuthError::Duplicate(what());
        }
    }
    AuthError::Database(e.to_string())
}

fn validate_set(permissions: &PermissionSet) -> Result<(), AuthError> {
    for p in permissions {
        Permission::parse(p)?;
    }
    Ok(())
}

fn load_permissions(conn: &Connection, role_id: &str) -> Result<PermissionSet, AuthError> {
    let mut stmt =
        conn.prepare("SELECT permission FROM gh_role_permissions WHERE role_id = ?1")?;
    let perms = stmt
        .query_map([role_id], |row| row.get::<_, String>(0))?
        .collect::<Result<PermissionSet, _>>()?;
    Ok(perms)
}

fn write_permissions(
    conn: &Connection,
    role_id: &str,
    permissions: &PermissionSet,
) -> Result<(), AuthError> {
    conn.execute("DELETE FROM gh_role_permissions WHERE role_id = ?1", [role_id])?;
    let mut stmt =
        conn.prepare("INSERT INTO gh_role_permissions (role_id, permission) VALUES (?1, ?2)")?;
    for p in permissions {
        stmt.execute(rusqlite::params![role_id, p])?;
    }
    Ok(())
}

fn role_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_system: row.get::<_, i32>(3)? != 0,
        permissions: PermissionSet::new(),
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        is_active: row.get::<_, i32>(3)? != 0,
        created_at: row.get(4)?,
    })
}

fn query_role(conn: &Connection, column: &str, value: &str) -> Result<Role, AuthError> {
    let sql = format!("SELECT {ROLE_COLUMNS} FROM gh_roles WHERE {column} = ?1");
    let mut role = conn
        .query_row(&sql, [value], role_from_row)
        .optional()?
        .ok_or_else(|| AuthError::NotFound(format!("role '{value}' not found")))?;
    role.permissions = load_permissions(conn, &role.id)?;
    Ok(role)
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<User, AuthError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM gh_users WHERE {column} = ?1");
    conn.query_row(&sql, [value], user_from_row)
        .optional()?
        .ok_or_else(|| AuthError::NotFound(format!("user '{value}' not found")))
}

#[async_trait]
impl RoleStore for SqliteRoleStore {
    async fn migrate(&self) -> Result<(), AuthError> {
        let conn = self.conn()?;
        conn.execute_batch(MIGRATE_SQL)?;
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<(), AuthError> {
        super::seed::seed_defaults(self).await
    }

    // --- Roles ---

    async fn create_role(
        &self,
        name: &str,
        description: &str,
        is_system: bool,
        permissions: &PermissionSet,
    ) -> Result<Role, AuthError> {
        if name.trim().is_empty() {
            return Err(AuthError::InvalidInput("role name required".into()));
        }
        validate_set(permissions)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = uuid::Uuid::now_v7().to_string();
        let ts = now();
        tx.execute(
            "INSERT INTO gh_roles (id, name, description, is_system, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            rusqlite::params![id, name, description, is_system as i32, ts],
        )
        .map_err(|e| duplicate_or_db(e, || format!("role '{name}' already exists")))?;
        write_permissions(&tx, &id, permissions)?;
        tx.commit()?;

        tracing::debug!(role = name, permissions = permissions.len(), "created role");
        query_role(&conn, "id", &id)
    }

    async fn get_role(&self, id: &str) -> Result<Role, AuthError> {
        let conn = self.conn()?;
        query_role(&conn, "id", id)
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Role, AuthError> {
        let conn = self.conn()?;
        query_role(&conn, "name", name)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ROLE_COLUMNS} FROM gh_roles ORDER BY created_at, name"
        ))?;
        let mut roles = stmt
            .query_map([], role_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for role in &mut roles {
            role.permissions = load_permissions(&conn, &role.id)?;
        }
        Ok(roles)
    }

    async fn set_role_permissions(
        &self,
        id: &str,
        permissions: &PermissionSet,
    ) -> Result<Role, AuthError> {
        validate_set(permissions)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE gh_roles SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![now(), id],
        )?;
        if changed == 0 {
            return Err(AuthError::NotFound(format!("role '{id}' not found")));
        }
        write_permissions(&tx, id, permissions)?;
        tx.commit()?;

        tracing::debug!(role_id = id, permissions = permissions.len(), "updated role permissions");
        query_role(&conn, "id", id)
    }

    // Read and write under one lock so concurrent toggles on a role compose.
    async fn toggle_role_permission(&self, id: &str, permission: &str) -> Result<Role, AuthError> {
        Permission::parse(permission)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE gh_roles SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![now(), id],
        )?;
        if changed == 0 {
            return Err(AuthError::NotFound(format!("role '{id}' not found")));
        }
        let mut held = load_permissions(&tx, id)?;
        let granted = held.toggle(permission);
        write_permissions(&tx, id, &held)?;
        tx.commit()?;

        tracing::debug!(role_id = id, permission, granted, "toggled role permission");
        query_role(&conn, "id", id)
    }

    async fn delete_role(&self, id: &str) -> Result<(), AuthError> {
        let conn = self.conn()?;
        let role = query_role(&conn, "id", id)?;
        if role.is_system {
            return Err(AuthError::Forbidden(format!(
                "system role '{}' cannot be deleted",
                role.name
            )));
        }
        conn.execute("DELETE FROM gh_roles WHERE id = ?1", [id])?;
        tracing::debug!(role = %role.name, "deleted role");
        Ok(())
    }

    // --- Users ---

    async fn create_user(&self, username: &str, email: Option<&str>) -> Result<User, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::InvalidInput("username required".into()));
        }
        let conn = self.conn()?;
        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO gh_users (id, username, email, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, username, email, now()],
        )
        .map_err(|e| duplicate_or_db(e, || format!("user '{username}' already exists")))?;
        tracing::debug!(user = username, "created user");
        query_user(&conn, "id", &id)
    }

    async fn get_user(&self, id: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        query_user(&conn, "id", id)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, AuthError> {
        let conn = self.conn()?;
        query_user(&conn, "username", username)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM gh_users ORDER BY created_at, username"
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    // --- User-Role ---

    async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<(), AuthError> {
        let conn = self.conn()?;
        query_user(&conn, "id", user_id)?;
        query_role(&conn, "id", role_id)?;
        conn.execute(
            "INSERT OR IGNORE INTO gh_user_roles (user_id, role_id) VALUES (?1, ?2)",
            [user_id, role_id],
        )?;
        Ok(())
    }

    async fn unassign_role(&self, user_id: &str, role_id: &str) -> Result<(), AuthError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM gh_user_roles WHERE user_id = ?1 AND role_id = ?2",
            [user_id, role_id],
        )?;
        if changed == 0 {
            return Err(AuthError::NotFound("role assignment not found".into()));
        }
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<Role>, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.name, r.description, r.is_system, r.created_at, r.updated_at
             FROM gh_roles r
             JOIN gh_user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = ?1
             ORDER BY r.name",
        )?;
        let mut roles = stmt
            .query_map([user_id], role_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for role in &mut roles {
            role.permissions = load_permissions(&conn, &role.id)?;
        }
        Ok(roles)
    }

    async fn get_user_permissions(&self, user_id: &str) -> Result<PermissionSet, AuthError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT rp.permission
             FROM gh_role_permissions rp
             JOIN gh_user_roles ur ON ur.role_id = rp.role_id
             WHERE ur.user_id = ?1",
        )?;
        let perms = stmt
            .query_map([user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<PermissionSet, _>>()?;
        Ok(perms)
    }
}
