use crate::module_name::ModuleName;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The closed set of rule kinds a target can be synthesized for. Named
/// after the spec's own vocabulary, not the original tool's (which calls
/// the static-archive rule `ARCHIVE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Mkdir,
    Compile,
    EmitBmi,
    EmitInclude,
    LinkStatic,
    LinkSo,
    LinkMod,
    LinkExecutable,
}

impl RuleKind {
    /// `true` for rules whose edges exist only to order other edges and
    /// never need a command of their own in a back end that creates
    /// output directories implicitly.
    pub fn is_ignorable(self) -> bool {
        matches!(self, RuleKind::Mkdir)
    }
}

/// Which role a file plays in a target's input/output lists; used by
/// back ends to decide how to rebase a path (source tree vs. binary tree).
/// `HeaderModule` and `Include` distinguish the two sides of header-module
/// routing: the synthesized BMI a legacy header import resolves to, and
/// the actual header file on disk that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FileRole {
    Input,
    Output,
    Linked,
    HeaderModule,
    Include,
}

/// A file or a module reference, tagged by the role it plays in the edge
/// that names it. A `ModRef`'s `path` is the BMI path its name resolves
/// to, computed once at synthesis time so every reference to the same
/// module (or routed legacy header) agrees on it without re-deriving it
/// from the naming convention downstream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Artifact {
    FileRef { path: PathBuf, role: FileRole },
    ModRef { module: ModuleName, path: PathBuf },
}

impl Artifact {
    pub fn file(path: impl Into<PathBuf>, role: FileRole) -> Self {
        Artifact::FileRef {
            path: path.into(),
            role,
        }
    }

    pub fn module(name: ModuleName, path: impl Into<PathBuf>) -> Self {
        Artifact::ModRef { module: name, path: path.into() }
    }
}

/// The three dependency lists a Ninja-style back end distinguishes:
/// explicit, implicit (`|`), and order-only (`||`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLists {
    pub expl: Vec<Artifact>,
    pub implicit: Vec<Artifact>,
    pub order: Vec<Artifact>,
}

impl FileLists {
    pub fn is_empty(&self) -> bool {
        self.expl.is_empty() && self.implicit.is_empty() && self.order.is_empty()
    }
}

/// A single build edge: a rule applied to inputs to produce outputs.
/// `rule` is `None` for a pure source node (no command, just an artifact
/// the graph can point at).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub rule: Option<RuleKind>,
    pub main_output: Artifact,
    pub inputs: FileLists,
    pub outputs: FileLists,
    /// Extra label attached to the edge (e.g. the implementation unit's
    /// BMI-producing companion output), opaque to the synthesizer.
    pub edge: Option<String>,
}

impl Target {
    pub fn source_node(artifact: Artifact) -> Self {
        Self {
            rule: None,
            main_output: artifact,
            inputs: FileLists::default(),
            outputs: FileLists::default(),
            edge: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mkdir_is_the_only_ignorable_rule() {
        assert!(RuleKind::Mkdir.is_ignorable());
        assert!(!RuleKind::Compile.is_ignorable());
        assert!(!RuleKind::LinkExecutable.is_ignorable());
    }

    #[test]
    fn source_node_has_no_rule_and_empty_lists() {
        let t = Target::source_node(Artifact::file("a.cc", FileRole::Input));
        assert!(t.rule.is_none());
        assert!(t.inputs.is_empty());
        assert!(t.outputs.is_empty());
    }

    #[test]
    fn artifact_ordering_is_total() {
        let mut v = vec![
            Artifact::module(ModuleName::plain("b"), "gcm.cache/b.gcm"),
            Artifact::file("a.cc", FileRole::Input),
            Artifact::module(ModuleName::plain("a"), "gcm.cache/a.gcm"),
        ];
        v.sort();
        // FileRef < ModRef by derive order; within ModRef, by module name.
        assert_eq!(v[0], Artifact::file("a.cc", FileRole::Input));
        assert_eq!(v[1], Artifact::module(ModuleName::plain("a"), "gcm.cache/a.gcm"));
        assert_eq!(v[2], Artifact::module(ModuleName::plain("b"), "gcm.cache/b.gcm"));
    }
}
