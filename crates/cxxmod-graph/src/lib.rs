//! Target synthesis: turns a `BuildInfo` into the flat list of build
//! targets a back end renders into its own format. Grounded on
//! `original_source/src/xml/compiler.cc::mapout` (per-source target
//! emission) and `original_source/src/compiler.cc::create_project_target`
//! (per-project link edge, including the transitive-link BFS whose
//! cycle guard this crate corrects to `continue` rather than `break`:
//! the original drops every sibling still queued behind a project it
//! has already visited, which under-links diamond dependency graphs).

use cxxmod_model::{Artifact, BuildInfo, FileLists, FileRole, ModuleName, Project, ProjectInfo, ProjectKind, RuleKind, Target};
use cxxmod_toolchain::{Descriptor, OsProfile};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

/// Builds the `ModRef` artifact for `name`, resolving its BMI path through
/// the descriptor's naming convention once so every reference to the same
/// module agrees on it.
fn module_artifact(descriptor: &Descriptor, name: &ModuleName) -> Artifact {
    Artifact::module(name.clone(), descriptor.bmi.bmi_path(&name.module, &name.part))
}

/// `true` for a legacy-header import (`import <vector>;`/`import "local.h";`),
/// encoded by `cxxmod-scan` as a `ModuleName` with an empty `part` and the
/// verbatim bracketed/quoted header text in `module`.
fn is_legacy_header(name: &ModuleName) -> bool {
    name.part.is_empty()
        && ((name.module.starts_with('<') && name.module.ends_with('>'))
            || (name.module.starts_with('"') && name.module.ends_with('"')))
}

/// Strips the `<>`/`"` wrapping off a legacy-header import's verbatim text,
/// leaving the bare filename to search for on the include path.
fn header_filename(name: &ModuleName) -> &str {
    name.module.trim_matches(|c| c == '<' || c == '>' || c == '"')
}

/// Finds a legacy header on disk by trying it against each discovered
/// include directory in order, first match wins.
fn locate_header(filename: &str, include_dirs: &[PathBuf]) -> Option<PathBuf> {
    include_dirs.iter().map(|dir| dir.join(filename)).find(|candidate| candidate.is_file())
}

/// The result of target synthesis: the flat target list plus the set of
/// rules actually referenced, so the emitter only materializes rules a
/// target uses.
#[derive(Debug, Default)]
pub struct Graph {
    pub targets: Vec<Target>,
    pub rules_needed: BTreeSet<RuleKind>,
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

fn link_rule_for(kind: ProjectKind) -> RuleKind {
    match kind {
        ProjectKind::Executable => RuleKind::LinkExecutable,
        ProjectKind::StaticLib => RuleKind::LinkStatic,
        ProjectKind::SharedLib => RuleKind::LinkSo,
        ProjectKind::ModuleLib => RuleKind::LinkMod,
    }
}

/// Builds a project's library/executable target: its object-file inputs
/// plus a breadth-first transitive walk of its `links` set. A project
/// already seen is skipped with `continue`, not `break`, so later
/// siblings in the queue still get linked in.
fn create_project_target(prj: &Project, info: &ProjectInfo, build: &BuildInfo, profile: OsProfile) -> Target {
    let rule = link_rule_for(prj.kind);
    let filename = info.subdir.join(prj.filename_with_affixes(profile.affixes(prj.kind)));

    let mut inputs = FileLists::default();
    for source in &info.sources {
        let objfile = append_suffix(&info.subdir.join(source), ".o");
        inputs.expl.push(Artifact::file(objfile, FileRole::Output));
    }

    if prj.kind != ProjectKind::StaticLib {
        let mut stack: VecDeque<Project> = info.links.iter().cloned().collect();
        let mut seen: BTreeSet<Project> = BTreeSet::from([prj.clone()]);

        while let Some(next) = stack.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            let next_info = build.projects.get(&next);
            if next_info.is_none() {
                log::warn!("project {:?} links against {:?}, which has no build info; linking by name only", prj.name, next.name);
            }
            let next_subdir = next_info.map(|i| i.subdir.clone()).unwrap_or_default();
            let next_filename = next_subdir.join(next.filename_with_affixes(profile.affixes(next.kind)));
            inputs.expl.push(Artifact::file(next_filename, FileRole::Linked));

            if let Some(next_info) = next_info {
                stack.extend(next_info.links.iter().cloned());
            }
        }
    }

    Target {
        rule: Some(rule),
        main_output: Artifact::file(filename, FileRole::Linked),
        inputs,
        outputs: FileLists::default(),
        edge: None,
    }
}

/// Synthesizes the full target list for a build, following the
/// standalone-vs-side-effect BMI split a descriptor declares. `include_dirs`
/// is the toolchain's discovered built-in search path, used only to route
/// legacy-header imports (see `header_module_target`).
pub fn synthesize(build: &BuildInfo, descriptor: &Descriptor, profile: OsProfile, include_dirs: &[PathBuf]) -> Graph {
    let standalone_bmi = descriptor.bmi.is_standalone();
    let mut graph = Graph::default();
    let mut header_targets: BTreeMap<ModuleName, Artifact> = BTreeMap::new();

    for (prj, info) in &build.projects {
        for source in &info.sources {
            let srcfile = info.subdir.join(source);
            let objfile = append_suffix(&srcfile, ".o");

            let imports = build.imports.get(&srcfile);
            let iface_name = build.exports.get(&srcfile);
            let has_modules = imports.is_some();
            let is_interface = iface_name.is_some();

            graph.targets.push(Target::source_node(Artifact::file(srcfile.clone(), FileRole::Input)));

            if standalone_bmi && is_interface {
                let name = iface_name.unwrap();
                graph.rules_needed.insert(RuleKind::EmitBmi);

                let mut bmi = Target {
                    rule: Some(RuleKind::EmitBmi),
                    main_output: module_artifact(descriptor, name),
                    inputs: FileLists::default(),
                    outputs: FileLists::default(),
                    edge: None,
                };
                bmi.inputs.expl.push(Artifact::file(srcfile.clone(), FileRole::Input));
                if let Some(mod_info) = build.modules.get(name) {
                    for req in &mod_info.req {
                        bmi.inputs.order.push(module_artifact(descriptor, req));
                    }
                }
                graph.targets.push(bmi);
            }

            graph.rules_needed.insert(RuleKind::Compile);
            let mut object = Target {
                rule: Some(RuleKind::Compile),
                main_output: Artifact::file(objfile, FileRole::Output),
                inputs: FileLists::default(),
                outputs: FileLists::default(),
                edge: None,
            };

            if !standalone_bmi && is_interface {
                let name = iface_name.unwrap();
                object.outputs.implicit.push(module_artifact(descriptor, name));
                object.edge = Some(name.to_string());
            }
            object.inputs.expl.push(Artifact::file(srcfile.clone(), FileRole::Input));

            if has_modules {
                for import in imports.unwrap() {
                    if is_legacy_header(import) {
                        if let Some(artifact) = header_targets.get(import) {
                            object.inputs.order.push(artifact.clone());
                        } else if let Some(header_path) = locate_header(header_filename(import), include_dirs) {
                            let artifact = module_artifact(descriptor, import);
                            graph.rules_needed.insert(RuleKind::EmitInclude);
                            let mut include_target = Target {
                                rule: Some(RuleKind::EmitInclude),
                                main_output: artifact.clone(),
                                inputs: FileLists::default(),
                                outputs: FileLists::default(),
                                edge: None,
                            };
                            include_target.inputs.expl.push(Artifact::file(header_path, FileRole::Include));
                            graph.targets.push(include_target);
                            header_targets.insert(import.clone(), artifact.clone());
                            object.inputs.order.push(artifact);
                        } else {
                            log::warn!(
                                "header {} imported by {} not found on the discovered include path; skipping its BMI dependency",
                                import.module,
                                srcfile.display()
                            );
                        }
                    } else {
                        object.inputs.order.push(module_artifact(descriptor, import));
                    }
                }
            }
            graph.targets.push(object);
        }

        let library = create_project_target(prj, info, build, profile);
        if let Some(rule) = library.rule {
            graph.rules_needed.insert(rule);
        }
        graph.targets.push(library);
    }

    graph
}
