use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The kind of artifact a project builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectKind {
    Executable,
    StaticLib,
    SharedLib,
    ModuleLib,
}

impl ProjectKind {
    /// Unix-style `(prefix, suffix)` pair; an `OsProfile` in `cxxmod-toolchain`
    /// may override these for MSVC-flavored compilers.
    pub fn unix_affixes(self) -> (&'static str, &'static str) {
        match self {
            ProjectKind::Executable => ("", ""),
            ProjectKind::StaticLib => ("lib", ".a"),
            ProjectKind::SharedLib => ("lib", ".so"),
            ProjectKind::ModuleLib => ("lib", ".mod"),
        }
    }
}

/// A project identity: name plus kind. Ordered lexicographically by name
/// then kind so that map iteration is deterministic (§5).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub kind: ProjectKind,
}

impl Project {
    pub fn new(name: impl Into<String>, kind: ProjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn filename(&self) -> String {
        self.filename_with_affixes(self.kind.unix_affixes())
    }

    pub fn filename_with_affixes(&self, affixes: (&str, &str)) -> String {
        let (prefix, suffix) = affixes;
        format!("{prefix}{}{suffix}", self.name)
    }
}

/// Filesystem layout of a project's inputs, as loaded from `sources.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSetup {
    pub subdir: PathBuf,
    pub sources: Vec<PathBuf>,
}
