use crate::module_name::ModuleName;
use crate::project::{Project, ProjectSetup};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Per-module aggregate across all translation units that mention it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Source path of the interface unit, if one was scanned.
    /// Non-empty iff some scanned unit with this name was an interface unit.
    pub interface: Option<PathBuf>,
    pub sources: Vec<PathBuf>,
    /// Modules this one requires, excluding its own name.
    pub req: BTreeSet<ModuleName>,
    pub libs: BTreeSet<Project>,
}

/// Per-project aggregate of module exports/imports and lifted link edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub subdir: PathBuf,
    pub sources: Vec<PathBuf>,
    pub exports: BTreeSet<ModuleName>,
    pub imports: BTreeSet<ModuleName>,
    pub links: BTreeSet<Project>,
}

impl ProjectInfo {
    pub fn from_setup(setup: &ProjectSetup) -> Self {
        Self {
            subdir: setup.subdir.clone(),
            sources: setup.sources.clone(),
            ..Default::default()
        }
    }
}

/// The aggregate produced by the build analyzer (component E) and consumed
/// by the target synthesizer (component F).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub source_root: PathBuf,
    pub binary_root: PathBuf,
    pub modules: BTreeMap<ModuleName, ModuleInfo>,
    pub projects: BTreeMap<Project, ProjectInfo>,
    pub imports: BTreeMap<PathBuf, Vec<ModuleName>>,
    pub exports: BTreeMap<PathBuf, ModuleName>,
}

impl BuildInfo {
    pub fn new(source_root: PathBuf, binary_root: PathBuf) -> Self {
        Self {
            source_root,
            binary_root,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectKind;

    #[test]
    fn invariant_imports_exports_disjoint_after_construction() {
        // A freshly-built ProjectInfo starts with empty sets, which trivially
        // satisfies `imports ∩ exports = ∅` (invariant 7 in spec.md §8);
        // the analyzer is responsible for maintaining it as imports/exports
        // are populated.
        let info = ProjectInfo::default();
        assert!(info.imports.is_disjoint(&info.exports));
    }

    #[test]
    fn default_build_info_has_no_modules_or_projects() {
        let build = BuildInfo::new(PathBuf::from("/src"), PathBuf::from("/bin"));
        assert!(build.modules.is_empty());
        assert!(build.projects.is_empty());
        let _ = Project::new("x", ProjectKind::Executable);
    }
}
