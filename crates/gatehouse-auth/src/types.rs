use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::editor::PermissionSet;
use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub permissions: PermissionSet,
    pub created_at: String,
    pub updated_at: String,
}

// Upstream field spellings, most preferred first.
const ID_KEYS: &[&str] = &["id", "_id", "ID", "Id"];
const USERNAME_KEYS: &[&str] = &["username", "userName", "Username", "name"];
const EMAIL_KEYS: &[&str] = &["email", "Email", "EMAIL"];
const ACTIVE_KEYS: &[&str] = &["is_active", "isActive", "active"];
const CREATED_KEYS: &[&str] = &["created_at", "createdAt", "CreatedAt"];
const UPDATED_KEYS: &[&str] = &["updated_at", "updatedAt", "UpdatedAt"];
const ROLE_NAME_KEYS: &[&str] = &["name", "Name", "roleName", "role_name"];
const DESCRIPTION_KEYS: &[&str] = &["description", "Description", "desc"];
const SYSTEM_KEYS: &[&str] = &["is_system", "isSystem", "system"];
const PERMISSION_KEYS: &[&str] = &["permissions", "Permissions", "perms"];

fn pick<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn pick_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match pick(obj, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn pick_bool(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    match pick(obj, keys)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, AuthError> {
    value
        .as_object()
        .ok_or_else(|| AuthError::InvalidInput(format!("{what} record must be a JSON object")))
}

impl User {
    /// Normalize an upstream user record.
    pub fn from_upstream(value: &Value) -> Result<Self, AuthError> {
        let obj = as_object(value, "user")?;
        let id = pick_string(obj, ID_KEYS)
            .ok_or_else(|| AuthError::InvalidInput("user record has no id".into()))?;
        let email = pick_string(obj, EMAIL_KEYS);
        let username = pick_string(obj, USERNAME_KEYS)
            .or_else(|| email.clone())
            .ok_or_else(|| AuthError::InvalidInput(format!("user {id} has no username")))?;
        Ok(Self {
            id,
            username,
            email,
            is_active: pick_bool(obj, ACTIVE_KEYS).unwrap_or(true),
            created_at: pick_string(obj, CREATED_KEYS).unwrap_or_default(),
        })
    }
}

/// `None` when the record carries no permission field at all.
fn pick_permissions(
    obj: &Map<String, Value>,
    role: &str,
) -> Result<Option<PermissionSet>, AuthError> {
    let Some(value) = pick(obj, PERMISSION_KEYS) else {
        return Ok(None);
    };
    let not_strings =
        || AuthError::InvalidInput(format!("role {role}: permissions must be an array of strings"));
    let items = value.as_array().ok_or_else(not_strings)?;
    items
        .iter()
        .map(|v| v.as_str().ok_or_else(not_strings))
        .collect::<Result<PermissionSet, _>>()
        .map(Some)
}

impl Role {
    /// Normalize an upstream role record. A missing permission field yields an
    /// empty set; use [`Role::upstream_permissions`] to tell the two apart.
    pub fn from_upstream(value: &Value) -> Result<Self, AuthError> {
        let obj = as_object(value, "role")?;
        let id = pick_string(obj, ID_KEYS)
            .ok_or_else(|| AuthError::InvalidInput("role record has no id".into()))?;
        let name = pick_string(obj, ROLE_NAME_KEYS)
            .ok_or_else(|| AuthError::InvalidInput(format!("role {id} has no name")))?;
        let permissions = pick_permissions(obj, &name)?.unwrap_or_default();
        Ok(Self {
            id,
            name,
            description: pick_string(obj, DESCRIPTION_KEYS).unwrap_or_default(),
            is_system: pick_bool(obj, SYSTEM_KEYS).unwrap_or(false),
            permissions,
            created_at: pick_string(obj, CREATED_KEYS).unwrap_or_default(),
            updated_at: pick_string(obj, UPDATED_KEYS).unwrap_or_default(),
        })
    }

    /// The held set an upstream role record carries, or `None` if it has no
    /// permission field.
    pub fn upstream_permissions(value: &Value) -> Result<Option<PermissionSet>, AuthError> {
        let obj = as_object(value, "role")?;
        let name = pick_string(obj, ROLE_NAME_KEYS).unwrap_or_default();
        pick_permissions(obj, &name)
    }
}
