use serde::{Deserialize, Serialize};
use std::fmt;

/// A C++20 module name: either a plain module, a partition of one, or a
/// legacy-header import (`module` holds the verbatim `<...>`/`"..."` text
/// and `part` is always empty in that case).
///
/// Both fields empty is the "global" name used to key the unnamed
/// translation unit (a source with no `module`/`export module` line).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleName {
    pub module: String,
    pub part: String,
}

impl ModuleName {
    pub fn new(module: impl Into<String>, part: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            part: part.into(),
        }
    }

    pub fn plain(module: impl Into<String>) -> Self {
        Self::new(module, String::new())
    }

    /// The unnamed-module key: `{ module: "", part: "" }`.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.module.is_empty() && self.part.is_empty()
    }

    pub fn is_partition(&self) -> bool {
        !self.part.is_empty()
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module)?;
        if !self.part.is_empty() {
            write!(f, ":{}", self.part)?;
        }
        Ok(())
    }
}

/// Per-translation-unit scan result, produced by the module scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleUnit {
    pub name: ModuleName,
    pub imports: Vec<ModuleName>,
    pub is_interface: bool,
}
