//! A simplified MSBuild (`.vcxproj`) emitter, grounded on
//! `original_source/src/generators/msbuild.cc`. The original derives a
//! project's GUID from an MD5 hash of `binary_dir|project_name` via
//! OpenSSL; since this crate carries no MD5/uuid dependency, project
//! GUIDs here come from `DefaultHasher` instead, formatted into the
//! same `{XXXXXXXX-XXXX-...}` shape MSBuild expects. The hash is not
//! cryptographic, but it only needs to be stable across runs, which
//! `DefaultHasher` over the same input guarantees within a build.

use crate::paths::resolve;
use cxxmod_model::{Project, ProjectInfo, ProjectKind};
use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::path::Path;

fn project_guid(binary_dir: &Path, name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    binary_dir.hash(&mut hasher);
    b'|'.hash(&mut hasher);
    name.hash(&mut hasher);
    let a = hasher.finish();

    let mut hasher2 = DefaultHasher::new();
    name.hash(&mut hasher2);
    b'|'.hash(&mut hasher2);
    binary_dir.hash(&mut hasher2);
    let b = hasher2.finish();

    format!(
        "{{{:08X}-{:04X}-{:04X}-{:04X}-{:012X}}}",
        (a >> 32) as u32,
        (a >> 16) as u16,
        a as u16,
        (b >> 48) as u16,
        b & 0xFFFFFFFFFFFF,
    )
}

fn name_of(kind: ProjectKind) -> &'static str {
    match kind {
        ProjectKind::Executable => "Application",
        ProjectKind::StaticLib => "StaticLibrary",
        ProjectKind::SharedLib => "DynamicLibrary",
        ProjectKind::ModuleLib => "Utility",
    }
}

/// Renders a single project's `.vcxproj` body; the caller writes one of
/// these per project plus whatever `.sln` wiring it wants.
pub fn generate_project(prj: &Project, info: &ProjectInfo, binary_dir: &Path, back_to_sources: &Path) -> String {
    let guid = project_guid(binary_dir, &prj.name);
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<Project DefaultTargets=\"Build\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n");
    let _ = writeln!(out, "  <PropertyGroup Label=\"Globals\">");
    let _ = writeln!(out, "    <ProjectGuid>{guid}</ProjectGuid>");
    let _ = writeln!(out, "    <ConfigurationType>{}</ConfigurationType>", name_of(prj.kind));
    let _ = writeln!(out, "    <RootNamespace>{}</RootNamespace>", prj.name);
    out.push_str("  </PropertyGroup>\n");

    out.push_str("  <ItemGroup>\n");
    for source in &info.sources {
        let artifact = cxxmod_model::Artifact::file(info.subdir.join(source), cxxmod_model::FileRole::Input);
        let rebased = resolve(&artifact, back_to_sources);
        let _ = writeln!(out, "    <ClCompile Include=\"{}\" />", rebased.display());
    }
    out.push_str("  </ItemGroup>\n");
    out.push_str("</Project>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn guid_is_stable_across_calls_with_the_same_input() {
        let a = project_guid(Path::new("/bin"), "app");
        let b = project_guid(Path::new("/bin"), "app");
        assert_eq!(a, b);
    }

    #[test]
    fn guid_differs_for_different_project_names() {
        let a = project_guid(Path::new("/bin"), "app");
        let b = project_guid(Path::new("/bin"), "lib");
        assert_ne!(a, b);
    }

    #[test]
    fn project_body_lists_every_source_rebased_to_the_source_tree() {
        let prj = Project::new("app", ProjectKind::Executable);
        let mut info = ProjectInfo::default();
        info.sources.push(PathBuf::from("main.cc"));
        let out = generate_project(&prj, &info, Path::new("/bin"), Path::new("../src"));
        assert!(out.contains("../src/main.cc"));
        assert!(out.contains("ConfigurationType>Application"));
    }
}
