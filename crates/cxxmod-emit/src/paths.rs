//! Shared artifact-to-path rebasing, grounded on `filename_from` in
//! `original_source/src/generators/{ninja,msbuild}.cc`: an input path is
//! rebased through `back_to_sources`; an output, linked, or include path
//! is taken as-is (it was already written relative to the build directory,
//! or is an absolute header location, when the target was synthesized);
//! a module reference's path was resolved through the toolchain's BMI
//! naming convention once, by `cxxmod-graph`, at synthesis time.

use cxxmod_model::{Artifact, FileRole};
use std::path::{Path, PathBuf};

pub fn resolve(artifact: &Artifact, back_to_sources: &Path) -> PathBuf {
    match artifact {
        Artifact::FileRef { path, role: FileRole::Input } => back_to_sources.join(path),
        Artifact::FileRef { path, role: FileRole::Output | FileRole::Linked | FileRole::HeaderModule | FileRole::Include } => path.clone(),
        Artifact::ModRef { path, .. } => path.clone(),
    }
}
