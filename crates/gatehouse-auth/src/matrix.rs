//! The permission matrix: the catalog of modules, actions and every concrete
//! permission the system recognizes.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};
use crate::permissions::{self, WILDCARD_SUFFIX, has_permission, is_wildcard, segments};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMatrix {
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// One `module.submodule.*` bucket of a module view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmoduleGroup {
    pub name: String,
    pub permissions: Vec<String>,
}

/// Direct `module.action` entries plus `module.sub.action` entries bucketed by `sub`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleView {
    pub module: String,
    pub direct: Vec<String>,
    pub submodules: Vec<SubmoduleGroup>,
}

impl ModuleView {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.submodules.is_empty()
    }

    pub fn submodule(&self, name: &str) -> Option<&SubmoduleGroup> {
        self.submodules.iter().find(|s| s.name == name)
    }
}

pub fn module_wildcard(module: &str) -> String {
    format!("{module}{WILDCARD_SUFFIX}")
}

pub fn submodule_wildcard(module: &str, submodule: &str) -> String {
    format!("{module}.{submodule}{WILDCARD_SUFFIX}")
}

/// Things `validate` found suspicious. None of them make the matrix unusable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixReport {
    pub duplicates: Vec<String>,
    pub wildcards: Vec<String>,
    pub malformed: Vec<String>,
    pub unknown_modules: Vec<String>,
}

impl MatrixReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
            && self.wildcards.is_empty()
            && self.malformed.is_empty()
            && self.unknown_modules.is_empty()
    }
}

impl PermissionMatrix {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a matrix JSON file and log anything `validate` reports.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuthError::Config(format!(
                "matrix file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let matrix = Self::from_json(&content)?;
        let report = matrix.validate();
        if !report.is_clean() {
            tracing::warn!(
                path = %path.display(),
                duplicates = report.duplicates.len(),
                wildcards = report.wildcards.len(),
                malformed = report.malformed.len(),
                unknown_modules = report.unknown_modules.len(),
                "permission matrix has inconsistencies"
            );
        }
        tracing::debug!(
            modules = matrix.modules.len(),
            permissions = matrix.permissions.len(),
            "loaded permission matrix"
        );
        Ok(matrix)
    }

    pub fn validate(&self) -> MatrixReport {
        let mut report = MatrixReport::default();
        let mut seen = HashSet::new();
        for p in &self.permissions {
            if !seen.insert(p.as_str()) {
                report.duplicates.push(p.clone());
            }
            if is_wildcard(p) {
                report.wildcards.push(p.clone());
            } else if !permissions::is_well_formed(p) {
                report.malformed.push(p.clone());
            }
            let module = segments(p).next().unwrap_or_default();
            if !self.modules.iter().any(|m| m == module)
                && !report.unknown_modules.iter().any(|m| m == module)
            {
                report.unknown_modules.push(module.to_string());
            }
        }
        report
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn module_view(&self, module: &str) -> ModuleView {
        let mut view = ModuleView {
            module: module.to_string(),
            direct: Vec::new(),
            submodules: Vec::new(),
        };
        for p in &self.permissions {
            let parts: Vec<&str> = segments(p).collect();
            if parts[0] != module {
                continue;
            }
            match parts.len() {
                2 => view.direct.push(p.clone()),
                3 => match view.submodules.iter_mut().find(|s| s.name == parts[1]) {
                    Some(group) => group.permissions.push(p.clone()),
                    None => view.submodules.push(SubmoduleGroup {
                        name: parts[1].to_string(),
                        permissions: vec![p.clone()],
                    }),
                },
                _ => {}
            }
        }
        view
    }

    /// A view for every entry of `modules`, in order.
    pub fn module_views(&self) -> Vec<ModuleView> {
        self.modules.iter().map(|m| self.module_view(m)).collect()
    }

    /// Universe entries a held wildcard reaches. A concrete permission covers
    /// itself when it belongs to the universe.
    pub fn covered_by(&self, permission: &str) -> Vec<String> {
        self.permissions
            .iter()
            .filter(|p| has_permission([permission], p))
            .cloned()
            .collect()
    }

    /// Every wildcard that can be synthesized from the universe: one per
    /// module and one per submodule.
    pub fn synthesized_wildcards(&self) -> Vec<String> {
        let mut out = Vec::new();
        for view in self.module_views() {
            out.push(module_wildcard(&view.module));
            for sub in &view.submodules {
                out.push(submodule_wildcard(&view.module, &sub.name));
            }
        }
        out
    }

    /// Held entries that are neither in the universe nor a synthesizable wildcard.
    pub fn orphaned<I, S>(&self, held: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wildcards = self.synthesized_wildcards();
        held.into_iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| !self.contains(p) && !wildcards.contains(p))
            .collect()
    }
}
