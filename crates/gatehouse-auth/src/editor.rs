//! Held permission sets and the toggle semantics of the role editor.
//!
//! Toggling is a symmetric difference on exactly one string. Adding a
//! wildcard does not remove the narrower entries it covers and removing one
//! does not restore them; redundant entries persist in the stored set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::matrix::{ModuleView, PermissionMatrix, module_wildcard, submodule_wildcard};
use crate::permissions::{has_permission, permission_label};

/// The permissions held by a user or role. Serializes as a JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn insert(&mut self, permission: impl Into<String>) -> bool {
        self.0.insert(permission.into())
    }

    pub fn remove(&mut self, permission: &str) -> bool {
        self.0.remove(permission)
    }

    /// Remove if present, add if absent. Returns whether it is now held.
    pub fn toggle(&mut self, permission: &str) -> bool {
        if self.0.remove(permission) {
            false
        } else {
            self.0.insert(permission.to_string());
            true
        }
    }

    /// Copy with `permission` toggled; `self` is left as is.
    pub fn toggled(&self, permission: &str) -> Self {
        let mut next = self.clone();
        next.toggle(permission);
        next
    }

    pub fn toggle_module_wildcard(&mut self, module: &str) -> bool {
        self.toggle(&module_wildcard(module))
    }

    pub fn toggle_submodule_wildcard(&mut self, module: &str, submodule: &str) -> bool {
        self.toggle(&submodule_wildcard(module, submodule))
    }

    /// Wildcard-aware lookup, see [`has_permission`].
    pub fn allows(&self, required: &str) -> bool {
        has_permission(&self.0, required)
    }

    /// How a concrete permission of a module grid renders against this set.
    /// The module wildcard wins over the submodule wildcard, which wins over
    /// the concrete entry.
    pub fn check_state(
        &self,
        module: &str,
        submodule: Option<&str>,
        permission: &str,
    ) -> CheckState {
        if self.contains(&module_wildcard(module)) {
            CheckState::ModuleWildcard
        } else if submodule.is_some_and(|sub| self.contains(&submodule_wildcard(module, sub))) {
            CheckState::SubmoduleWildcard
        } else if self.contains(permission) {
            CheckState::Granted
        } else {
            CheckState::Unchecked
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Unchecked,
    Granted,
    SubmoduleWildcard,
    ModuleWildcard,
}

impl CheckState {
    pub fn is_checked(self) -> bool {
        self != CheckState::Unchecked
    }

    /// Concrete toggles are disabled while a wildcard covers them.
    pub fn is_locked(self) -> bool {
        matches!(self, CheckState::SubmoduleWildcard | CheckState::ModuleWildcard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub permission: String,
    pub label: String,
    pub state: CheckState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSection {
    pub submodule: String,
    pub wildcard: String,
    pub wildcard_held: bool,
    pub rows: Vec<GridRow>,
}

/// Render model of one module in the role editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleGrid {
    pub module: String,
    pub wildcard: String,
    pub wildcard_held: bool,
    pub direct: Vec<GridRow>,
    pub sections: Vec<GridSection>,
}

impl ModuleGrid {
    pub fn build(matrix: &PermissionMatrix, held: &PermissionSet, module: &str) -> Self {
        Self::from_view(&matrix.module_view(module), held)
    }

    pub fn from_view(view: &ModuleView, held: &PermissionSet) -> Self {
        let module = view.module.as_str();
        let row = |permission: &String, submodule: Option<&str>| GridRow {
            permission: permission.clone(),
            label: permission_label(permission),
            state: held.check_state(module, submodule, permission),
        };
        let wildcard = module_wildcard(module);
        Self {
            module: module.to_string(),
            wildcard_held: held.contains(&wildcard),
            wildcard,
            direct: view.direct.iter().map(|p| row(p, None)).collect(),
            sections: view
                .submodules
                .iter()
                .map(|sub| {
                    let wildcard = submodule_wildcard(module, &sub.name);
                    GridSection {
                        submodule: sub.name.clone(),
                        wildcard_held: held.contains(&wildcard),
                        wildcard,
                        rows: sub
                            .permissions
                            .iter()
                            .map(|p| row(p, Some(sub.name.as_str())))
                            .collect(),
                    }
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &GridRow> {
        self.direct
            .iter()
            .chain(self.sections.iter().flat_map(|s| s.rows.iter()))
    }

    pub fn checked_count(&self) -> usize {
        self.rows().filter(|r| r.state.is_checked()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> PermissionMatrix {
        PermissionMatrix {
            modules: vec!["content".into()],
            actions: vec!["view".into(), "edit".into()],
            permissions: vec![
                "content.view".into(),
                "content.edit".into(),
                "content.media.view".into(),
            ],
        }
    }

    #[test]
    fn toggle_twice_restores() {
        let original: PermissionSet = ["users.view"].into_iter().collect();
        let mut set = original.clone();
        assert!(set.toggle("users.edit"));
        assert!(!set.toggle("users.edit"));
        assert_eq!(set, original);
    }

    #[test]
    fn toggled_leaves_source_untouched() {
        let set: PermissionSet = ["a.b"].into_iter().collect();
        let next = set.toggled("a.b");
        assert!(set.contains("a.b"));
        assert!(next.is_empty());
    }

    #[test]
    fn wildcard_toggle_keeps_redundant_entries() {
        let mut set: PermissionSet = ["content.view", "content.media.*"].into_iter().collect();
        assert!(set.toggle_module_wildcard("content"));
        assert_eq!(set.to_vec(), vec!["content.*", "content.media.*", "content.view"]);
        assert!(!set.toggle_module_wildcard("content"));
        assert_eq!(set.to_vec(), vec!["content.media.*", "content.view"]);
    }

    #[test]
    fn submodule_wildcard_toggle() {
        let mut set = PermissionSet::new();
        assert!(set.toggle_submodule_wildcard("security", "email"));
        assert!(set.contains("security.email.*"));
        assert!(set.allows("security.email.edit"));
        assert!(!set.allows("security.password.edit"));
    }

    #[test]
    fn check_state_precedence() {
        let mut set: PermissionSet = ["content.media.view", "content.media.*"]
            .into_iter()
            .collect();
        assert_eq!(
            set.check_state("content", Some("media"), "content.media.view"),
            CheckState::SubmoduleWildcard
        );
        set.toggle_module_wildcard("content");
        assert_eq!(
            set.check_state("content", Some("media"), "content.media.view"),
            CheckState::ModuleWildcard
        );
        let plain: PermissionSet = ["content.view"].into_iter().collect();
        assert_eq!(plain.check_state("content", None, "content.view"), CheckState::Granted);
        assert_eq!(plain.check_state("content", None, "content.edit"), CheckState::Unchecked);
    }

    #[test]
    fn locking_follows_wildcards() {
        assert!(!CheckState::Unchecked.is_checked());
        assert!(CheckState::Granted.is_checked());
        assert!(!CheckState::Granted.is_locked());
        assert!(CheckState::SubmoduleWildcard.is_locked());
        assert!(CheckState::ModuleWildcard.is_locked());
    }

    #[test]
    fn grid_reflects_held_set() {
        let held: PermissionSet = ["content.media.*"].into_iter().collect();
        let grid = ModuleGrid::build(&matrix(), &held, "content");
        assert!(!grid.wildcard_held);
        assert_eq!(grid.direct.len(), 2);
        assert_eq!(grid.direct[0].label, "Content - View");
        assert_eq!(grid.direct[0].state, CheckState::Unchecked);
        assert_eq!(grid.sections.len(), 1);
        assert!(grid.sections[0].wildcard_held);
        assert_eq!(grid.sections[0].rows[0].state, CheckState::SubmoduleWildcard);
        assert_eq!(grid.checked_count(), 1);
    }

    #[test]
    fn content_media_scenario() {
        let held: PermissionSet = ["content.media.*"].into_iter().collect();
        assert!(held.allows("content.media.view"));
        assert!(!held.allows("content.view"));

        let mut next = held.clone();
        next.toggle_module_wildcard("content");
        assert!(next.allows("content.edit"));
        assert_eq!(ModuleGrid::build(&matrix(), &next, "content").checked_count(), 3);
    }

    #[test]
    fn serializes_as_string_array() {
        let set: PermissionSet = ["b.x", "a.y"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a.y","b.x"]"#);
        let back: PermissionSet = serde_json::from_str(r#"["a.y","a.y","b.x"]"#).unwrap();
        assert_eq!(back.len(), 2);
    }
}
