//! Build-graph analysis: loads a project tree's `sources.json` manifests,
//! preprocesses and scans every source, and folds the per-unit module
//! declarations into the project-level aggregate the target synthesizer
//! consumes. Grounded on `original_source/src/types.cc::build_info::analyze`.

pub mod project_loader;

use anyhow::Result;
use cxxmod_model::{BuildInfo, ModuleName, Project, ProjectInfo, ProjectSetup};
use cxxmod_toolchain::Toolchain;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Preprocesses and scans every source of every project, then lifts
/// project-level imports that another project exports into link edges.
pub fn analyze(
    projects: &BTreeMap<Project, ProjectSetup>,
    toolchain: &Toolchain,
    source_dir: &Path,
    binary_dir: &Path,
) -> Result<BuildInfo> {
    let mut build = BuildInfo::new(normalize(source_dir), normalize(binary_dir));

    for (project, setup) in projects {
        let mut info = ProjectInfo::from_setup(setup);

        for source in &setup.sources {
            let srcfile = setup.subdir.join(source);
            let abs_srcfile = source_dir.join(&srcfile);

            let bytes = match std::fs::read(&abs_srcfile) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("cannot read {}: {e}; skipping", abs_srcfile.display());
                    continue;
                }
            };
            let text = match cxxmod_toolchain::proc::preprocess(&toolchain.cxx, &["-std=c++20"], &bytes) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("preprocessing {} failed: {e}; skipping", abs_srcfile.display());
                    continue;
                }
            };

            let unit = cxxmod_scan::scan(text.as_bytes());
            let u8path = srcfile.clone();

            let module_entry = build.modules.entry(unit.name.clone()).or_default();
            if !unit.name.is_empty() && unit.is_interface {
                module_entry.interface = Some(u8path.clone());
                build.exports.insert(u8path.clone(), unit.name.clone());
                info.exports.insert(unit.name.clone());
            }
            module_entry.libs.insert(project.clone());
            if !unit.is_interface {
                module_entry.sources.push(u8path.clone());
            }

            for import in &unit.imports {
                if unit.name != *import {
                    build.modules.entry(unit.name.clone()).or_default().req.insert(import.clone());
                }
                info.imports.insert(import.clone());
                build.imports.entry(u8path.clone()).or_default().push(import.clone());
            }
        }

        retain_unsatisfied(&mut info.imports, &info.exports);
        build.projects.insert(project.clone(), info);
    }

    lift_project_links(&mut build);

    Ok(build)
}

fn retain_unsatisfied(imports: &mut std::collections::BTreeSet<ModuleName>, exports: &std::collections::BTreeSet<ModuleName>) {
    imports.retain(|m| !exports.contains(m));
}

/// Turns remaining project-level imports into link dependencies: any
/// import still unsatisfied after a project's own exports have been
/// subtracted is resolved against every other project's exports, and
/// satisfying projects are added to `links`.
fn lift_project_links(build: &mut BuildInfo) {
    let export_owners: BTreeMap<ModuleName, Project> = build
        .projects
        .iter()
        .flat_map(|(prj, info)| info.exports.iter().map(move |m| (m.clone(), prj.clone())))
        .collect();

    for (_prj, info) in build.projects.iter_mut() {
        let mut links = std::collections::BTreeSet::new();
        info.imports.retain(|m| {
            if let Some(owner) = export_owners.get(m) {
                links.insert(owner.clone());
                false
            } else {
                true
            }
        });
        info.links.extend(links);
    }
}
