//! Wildcard permission evaluation.
//!
//! Permissions are dot-delimited paths such as `profile.view` or
//! `security.email.edit`. A trailing `*` segment (`profile.*`) grants every
//! strictly deeper path under its base. Everything here is pure and total:
//! malformed strings are compared segment by segment like any other input
//! and never cause a panic.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AuthError;

pub const WILDCARD_SUFFIX: &str = ".*";

pub const DEFAULT_ACTIONS: [&str; 4] = ["view", "create", "edit", "delete"];

/// Split a permission into its dot segments. The empty string is one empty segment.
pub fn segments(permission: &str) -> impl Iterator<Item = &str> + Clone {
    permission.split('.')
}

pub fn is_wildcard(permission: &str) -> bool {
    permission.ends_with(WILDCARD_SUFFIX)
}

/// Base of a wildcard (`a.b.*` -> `a.b`), `None` for concrete permissions.
pub fn wildcard_base(permission: &str) -> Option<&str> {
    permission.strip_suffix(WILDCARD_SUFFIX)
}

/// `segment(.segment)*` with non-empty segments, `*` allowed only last.
pub fn is_well_formed(permission: &str) -> bool {
    validate(permission).is_ok()
}

fn validate(permission: &str) -> Result<(), &'static str> {
    if permission.is_empty() {
        return Err("empty permission");
    }
    let parts: Vec<&str> = segments(permission).collect();
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return Err("empty segment");
        }
        if part.contains('*') && (i != last || *part != "*") {
            return Err("wildcard must be the whole final segment");
        }
    }
    if parts.len() == 1 && parts[0] == "*" {
        return Err("wildcard needs a base path");
    }
    Ok(())
}

fn wildcard_covers(base: &str, required: &str) -> bool {
    let base_parts = segments(base);
    let mut required_parts = segments(required);
    // Zip over the base, then require at least one more segment.
    for b in base_parts {
        match required_parts.next() {
            Some(r) if r == b => {}
            _ => return false,
        }
    }
    required_parts.next().is_some()
}

/// Whether `held` satisfies `required`, directly or through a wildcard.
///
/// A wildcard only reaches strictly deeper paths: `profile.*` covers
/// `profile.view` and `profile.photo.edit` but not `profile` itself.
/// A required string ending in `.*` is an ordinary literal here.
pub fn has_permission<I, S>(held: I, required: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    held.into_iter().any(|p| {
        let p = p.as_ref();
        if p == required {
            return true;
        }
        match wildcard_base(p) {
            Some(base) => wildcard_covers(base, required),
            None => false,
        }
    })
}

/// True when at least one of `required` is held. An empty list is never satisfied.
pub fn has_any_permission<I, S, R>(held: I, required: &[R]) -> bool
where
    I: IntoIterator<Item = S> + Copy,
    S: AsRef<str>,
    R: AsRef<str>,
{
    required.iter().any(|r| has_permission(held, r.as_ref()))
}

/// True when every one of `required` is held. An empty list is always satisfied,
/// even by an empty held set.
pub fn has_all_permissions<I, S, R>(held: I, required: &[R]) -> bool
where
    I: IntoIterator<Item = S> + Copy,
    S: AsRef<str>,
    R: AsRef<str>,
{
    if required.is_empty() {
        return true;
    }
    if held.into_iter().next().is_none() {
        return false;
    }
    required.iter().all(|r| has_permission(held, r.as_ref()))
}

/// Syntactic expansion of `base.*` into `base.<action>` for each action, in order.
/// Non-wildcards come back unchanged as a single entry.
pub fn expand_wildcard<A: AsRef<str>>(wildcard: &str, actions: &[A]) -> Vec<String> {
    match wildcard_base(wildcard) {
        Some(base) => actions
            .iter()
            .map(|a| format!("{base}.{}", a.as_ref()))
            .collect(),
        None => vec![wildcard.to_string()],
    }
}

pub fn expand_wildcard_default(wildcard: &str) -> Vec<String> {
    expand_wildcard(wildcard, &DEFAULT_ACTIONS)
}

/// Uppercase the first character only.
fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_path<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.map(title_case).collect::<Vec<_>>().join(" ")
}

/// Human-readable label.
///
/// `profile.*` -> `All Profile Actions`, `security.email.edit` -> `Security Email - Edit`.
/// A single-segment permission renders as its title-cased action alone.
pub fn permission_label(permission: &str) -> String {
    if let Some(base) = wildcard_base(permission) {
        return format!("All {} Actions", title_path(segments(base)));
    }
    match permission.rsplit_once('.') {
        Some((module_path, action)) => format!(
            "{} - {}",
            title_path(segments(module_path)),
            title_case(action)
        ),
        None => title_case(permission),
    }
}

/// Permissions bucketed by their first segment, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGroups {
    groups: Vec<(String, Vec<String>)>,
}

impl ModuleGroups {
    pub fn get(&self, module: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(m, _)| m == module)
            .map(|(_, perms)| perms.as_slice())
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(m, _)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(m, perms)| (m.as_str(), perms.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn push(&mut self, module: &str, permission: &str) {
        match self.groups.iter_mut().find(|(m, _)| m == module) {
            Some((_, perms)) => perms.push(permission.to_string()),
            None => self
                .groups
                .push((module.to_string(), vec![permission.to_string()])),
        }
    }
}

impl Serialize for ModuleGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (module, perms) in &self.groups {
            map.serialize_entry(module, perms)?;
        }
        map.end()
    }
}

/// Group by top-level module. Submodules are not separated here.
pub fn group_by_module<I, S>(permissions: I) -> ModuleGroups
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups = ModuleGroups::default();
    for p in permissions {
        let p = p.as_ref();
        let module = segments(p).next().unwrap_or_default();
        groups.push(module, p);
    }
    groups
}

/// A validated permission string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    pub fn parse(permission: &str) -> Result<Self, AuthError> {
        validate(permission).map_err(|reason| AuthError::invalid_permission(permission, reason))?;
        Ok(Self(permission.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        is_wildcard(&self.0)
    }

    /// First segment.
    pub fn module(&self) -> &str {
        segments(&self.0).next().unwrap_or_default()
    }

    pub fn label(&self) -> String {
        permission_label(&self.0)
    }
}

impl TryFrom<String> for Permission {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate(&value).map_err(|reason| AuthError::invalid_permission(&value, reason))?;
        Ok(Self(value))
    }
}

impl From<Permission> for String {
    fn from(p: Permission) -> Self {
        p.0
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
