//! Built-in reference catalog.
//!
//! The matrix served by the backend is the source of truth. This table is the
//! fallback when no matrix file is configured, and the fixture the tests use.

use crate::matrix::PermissionMatrix;

pub const MODULES: &[&str] = &[
    "dashboard",
    "users",
    "roles",
    "permissions",
    "content",
    "contacts",
    "profile",
    "security",
];

pub const ACTIONS: &[&str] = &["view", "create", "edit", "delete"];

pub const PERMISSIONS: &[(&str, &str)] = &[
    ("dashboard.view", "View the admin dashboard"),
    ("users.view", "View user list"),
    ("users.create", "Create users"),
    ("users.edit", "Update users"),
    ("users.delete", "Delete users"),
    ("roles.view", "View roles"),
    ("roles.create", "Create roles"),
    ("roles.edit", "Edit roles and their permissions"),
    ("roles.delete", "Delete roles"),
    ("permissions.view", "View the permission matrix"),
    ("permissions.edit", "Assign permissions"),
    ("content.view", "View content modules"),
    ("content.create", "Create content modules"),
    ("content.edit", "Edit content modules"),
    ("content.delete", "Delete content modules"),
    ("content.media.view", "Browse media"),
    ("content.media.create", "Upload media"),
    ("content.media.delete", "Delete media"),
    ("content.pages.view", "View pages"),
    ("content.pages.edit", "Edit pages"),
    ("contacts.view", "View contact submissions"),
    ("contacts.delete", "Delete contact submissions"),
    ("profile.view", "View own profile"),
    ("profile.edit", "Edit own profile"),
    ("security.email.view", "View sign-in email"),
    ("security.email.edit", "Change sign-in email"),
    ("security.password.edit", "Change password"),
];

pub struct DefaultRole {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: &'static [&'static str],
}

pub const DEFAULT_ROLES: &[DefaultRole] = &[
    DefaultRole {
        name: "viewer",
        description: "Read-only access to the dashboard and content",
        permissions: &[
            "dashboard.view",
            "content.view",
            "content.media.view",
            "content.pages.view",
            "profile.*",
            "security.*",
        ],
    },
    DefaultRole {
        name: "editor",
        description: "Manages content and reads contact submissions",
        permissions: &[
            "dashboard.view",
            "content.*",
            "contacts.view",
            "profile.*",
            "security.*",
        ],
    },
    DefaultRole {
        name: "admin",
        description: "Full administrative access",
        permissions: &[
            "dashboard.*",
            "users.*",
            "roles.*",
            "permissions.*",
            "content.*",
            "contacts.*",
            "profile.*",
            "security.*",
        ],
    },
];

/// A dashboard tab, shown when any one of `any_of` is held.
pub struct DashboardTab {
    pub key: &'static str,
    pub title: &'static str,
    pub any_of: &'static [&'static str],
}

pub const DASHBOARD_TABS: &[DashboardTab] = &[
    DashboardTab {
        key: "overview",
        title: "Overview",
        any_of: &[],
    },
    DashboardTab {
        key: "users",
        title: "Users",
        any_of: &["users.view"],
    },
    DashboardTab {
        key: "roles",
        title: "Roles & Permissions",
        any_of: &["roles.view", "permissions.view"],
    },
    DashboardTab {
        key: "content",
        title: "Content",
        any_of: &["content.view", "content.media.view", "content.pages.view"],
    },
    DashboardTab {
        key: "contacts",
        title: "Contact Submissions",
        any_of: &["contacts.view"],
    },
    DashboardTab {
        key: "account",
        title: "Account",
        any_of: &["profile.view", "security.email.view", "security.password.edit"],
    },
];

pub fn builtin_matrix() -> PermissionMatrix {
    PermissionMatrix {
        modules: MODULES.iter().map(|m| m.to_string()).collect(),
        actions: ACTIONS.iter().map(|a| a.to_string()).collect(),
        permissions: PERMISSIONS.iter().map(|(p, _)| p.to_string()).collect(),
    }
}

pub fn describe(permission: &str) -> Option<&'static str> {
    PERMISSIONS
        .iter()
        .find(|(p, _)| *p == permission)
        .map(|(_, desc)| *desc)
}
