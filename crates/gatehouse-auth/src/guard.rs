use crate::catalog::DashboardTab;
use crate::editor::PermissionSet;
use crate::error::AuthError;
use crate::permissions::{has_any_permission, has_permission};

/// Whoever is acting: a user with the merged permissions of their roles.
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub roles: Vec<String>,
    pub permissions: PermissionSet,
}

pub fn require_permission(subject: &Subject, permission: &str) -> Result<(), AuthError> {
    if has_permission(&subject.permissions, permission) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!(
            "missing permission: {permission}"
        )))
    }
}

pub fn require_any(subject: &Subject, permissions: &[&str]) -> Result<(), AuthError> {
    if has_any_permission(&subject.permissions, permissions) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!(
            "requires one of: {}",
            permissions.join(", ")
        )))
    }
}

pub fn require_all(subject: &Subject, permissions: &[&str]) -> Result<(), AuthError> {
    let missing: Vec<&str> = permissions
        .iter()
        .copied()
        .filter(|p| !has_permission(&subject.permissions, p))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!(
            "missing permissions: {}",
            missing.join(", ")
        )))
    }
}

/// Tabs visible to `held`, in `tabs` order. A tab with no requirement is always shown.
pub fn visible_tabs<'a>(
    held: &PermissionSet,
    tabs: &'a [DashboardTab],
) -> Vec<&'a DashboardTab> {
    tabs.iter()
        .filter(|tab| tab.any_of.is_empty() || has_any_permission(held, tab.any_of))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DASHBOARD_TABS;

    fn subject(perms: &[&str]) -> Subject {
        Subject {
            id: "u1".into(),
            name: "alice".into(),
            roles: vec!["editor".into()],
            permissions: perms.iter().copied().collect(),
        }
    }

    #[test]
    fn require_permission_forbids_missing() {
        let s = subject(&["content.*"]);
        assert!(require_permission(&s, "content.pages.edit").is_ok());
        let err = require_permission(&s, "users.view").unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(msg) if msg.contains("users.view")));
    }

    #[test]
    fn require_any_and_all() {
        let s = subject(&["users.view", "roles.*"]);
        assert!(require_any(&s, &["users.edit", "users.view"]).is_ok());
        assert!(require_any(&s, &[]).is_err());
        assert!(require_all(&s, &[]).is_ok());
        assert!(require_all(&s, &["users.view", "roles.edit"]).is_ok());
        let err = require_all(&s, &["users.view", "users.edit", "contacts.view"]).unwrap_err();
        let expected = "missing permissions: users.edit, contacts.view";
        assert!(matches!(err, AuthError::Forbidden(msg) if msg == expected));
        assert!(require_all(&s, &["roles.delete"]).is_ok());
    }

    #[test]
    fn empty_subject_sees_overview_only() {
        let held = PermissionSet::new();
        let keys: Vec<_> = visible_tabs(&held, DASHBOARD_TABS).iter().map(|t| t.key).collect();
        assert_eq!(keys, vec!["overview"]);
    }

    #[test]
    fn wildcards_reveal_tabs() {
        let held: PermissionSet = ["content.media.*", "profile.*"].into_iter().collect();
        let keys: Vec<_> = visible_tabs(&held, DASHBOARD_TABS).iter().map(|t| t.key).collect();
        assert_eq!(keys, vec!["overview", "content", "account"]);
    }
}
