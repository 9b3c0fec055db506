//! Compiler descriptor registry: locates a C++ toolchain, identifies
//! which descriptor it matches, and exposes the descriptor's rule
//! templates and BMI-naming convention to the rest of the workspace.
//! Grounded on `original_source/src/compiler.{hh,cc}` and the bundled
//! `compilers/{gcc,clang,cl}.cc` factories, which this crate replaces
//! with data-driven XML descriptors instead of one Rust type per vendor.

pub mod descriptor;
pub mod descriptors;
pub mod detect;
pub mod include_locator;
pub mod proc;
pub mod toolpath;

pub use descriptor::{BmiDecl, BmiKind, CommandTemplate, Descriptor, Ident, IncludeDirsRecipe, TemplateContext};

use anyhow::{bail, Context, Result};
use cxxmod_model::ProjectKind;
use std::path::{Path, PathBuf};

/// MSVC-flavored file-naming overrides for `ProjectKind::unix_affixes`;
/// a toolchain whose descriptor identifies as `compat = "cl"` uses this
/// instead of the model's Unix defaults.
#[derive(Debug, Clone, Copy)]
pub struct OsProfile {
    pub is_windows_like: bool,
}

impl OsProfile {
    pub fn unix() -> Self {
        Self { is_windows_like: false }
    }

    pub fn windows() -> Self {
        Self { is_windows_like: true }
    }

    pub fn affixes(self, kind: ProjectKind) -> (&'static str, &'static str) {
        if !self.is_windows_like {
            return kind.unix_affixes();
        }
        match kind {
            ProjectKind::Executable => ("", ".exe"),
            ProjectKind::StaticLib => ("", ".lib"),
            ProjectKind::SharedLib => ("", ".dll"),
            ProjectKind::ModuleLib => ("", ".ifc"),
        }
    }
}

/// A resolved toolchain: the compiler executable, the descriptor it
/// matched, and the OS affix profile implied by that descriptor.
pub struct Toolchain {
    pub cxx: PathBuf,
    pub descriptor: Descriptor,
    pub profile: OsProfile,
}

/// The registry of descriptors this crate ships with, in detection
/// order (most specific guard first, matching `compiler.cc`'s factory
/// registration order: GCC and Clang both guard on predefined macros
/// that never overlap, so order between them doesn't matter; MSVC is
/// listed last since `_MSC_VER` never fires under gcc/clang anyway).
pub fn builtin_descriptors() -> Result<Vec<Descriptor>> {
    Ok(vec![
        descriptor::parse_descriptor(descriptors::GCC_LIKE)?,
        descriptor::parse_descriptor(descriptors::CLANG_LIKE)?,
        descriptor::parse_descriptor(descriptors::CL_LIKE)?,
    ])
}

/// Resolves `$CXX` (or `c++` if unset), runs the synthetic detection
/// block through it, and matches the response against the descriptor
/// registry.
pub fn detect_toolchain() -> Result<Toolchain> {
    let cxx_name = std::env::var("CXX").unwrap_or_else(|_| "c++".to_string());
    let cxx = toolpath::resolve_tool(&cxx_name);

    let descriptors = builtin_descriptors()?;
    let source = detect::detection_source(&descriptors);
    let output = proc::preprocess(&cxx, &[], source.as_bytes())
        .with_context(|| format!("failed to run detection block through {}", cxx.display()))?;

    let (name, _version_values) =
        detect::parse_detection_output(&output).context("compiler produced no recognizable detection output")?;
    let descriptor = detect::match_descriptor(&descriptors, &name)
        .with_context(|| format!("no bundled descriptor matches detected compiler {name:?}"))?
        .clone();

    let profile = if descriptor.ident.compat == "cl" {
        OsProfile::windows()
    } else {
        OsProfile::unix()
    };

    log::debug!("matched descriptor {:?} for detected compiler {name:?}", descriptor.ident.name);
    Ok(Toolchain { cxx, descriptor, profile })
}

/// Discovers the toolchain's built-in include search path using its
/// descriptor's recipe.
pub fn discover_include_dirs(toolchain: &Toolchain) -> Result<Vec<PathBuf>> {
    let recipe = &toolchain.descriptor.include_dirs;
    include_locator::locate_include_dirs(&recipe.command, &recipe.start, &recipe.stop, recipe.output, &toolchain.cxx)
}

/// Finds the first resolvable path among a toolchain's plain name and
/// its PATH-resolved form; used by callers that already have a `Path`
/// they suspect is unqualified.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let name = path.to_string_lossy();
    let resolved = toolpath::resolve_tool(&name);
    if resolved.exists() {
        Ok(resolved)
    } else {
        bail!("could not resolve {} on PATH", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_descriptors_parse_and_cover_all_three_families() {
        let descs = builtin_descriptors().unwrap();
        let names: Vec<_> = descs.iter().map(|d| d.ident.name.as_str()).collect();
        assert_eq!(names, vec!["GCC", "Clang", "MSVC"]);
    }

    #[test]
    fn os_profile_overrides_project_kind_affixes_for_windows() {
        let win = OsProfile::windows();
        assert_eq!(win.affixes(ProjectKind::SharedLib), ("", ".dll"));
        assert_eq!(win.affixes(ProjectKind::StaticLib), ("", ".lib"));

        let unix = OsProfile::unix();
        assert_eq!(unix.affixes(ProjectKind::SharedLib), ("lib", ".so"));
    }
}
