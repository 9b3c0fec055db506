//! Recursive `sources.json` loader, grounded on
//! `original_source/src/types.cc::load_directory`.

use anyhow::{Context, Result};
use cxxmod_model::{Project, ProjectKind, ProjectSetup};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    #[serde(rename = "type")]
    kind: String,
    sources: Vec<String>,
}

fn kind_from_str(s: &str) -> Option<ProjectKind> {
    Some(match s {
        "executable" => ProjectKind::Executable,
        "static" => ProjectKind::StaticLib,
        "shared" => ProjectKind::SharedLib,
        "module" => ProjectKind::ModuleLib,
        _ => return None,
    })
}

/// The raw shape of a `sources.json` file: either a `.dirs` array of
/// subdirectories to recurse into, or named project entries, freely
/// mixed in the same object (the original tool dispatches per key).
fn load_directory(
    result: &mut BTreeMap<Project, ProjectSetup>,
    current: &Path,
    source_dir: &Path,
) -> Result<()> {
    let subdir = current.strip_prefix(source_dir).unwrap_or(current);
    let subdir = if subdir == Path::new("") { PathBuf::new() } else { subdir.to_path_buf() };

    let manifest_path = current.join("sources.json");
    let text = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("cannot open sources.json inside {}", current.display()))?;
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
        .with_context(|| format!("malformed sources.json in {}", current.display()))?;

    for (key, value) in raw {
        if key == ".dirs" {
            let Some(items) = value.as_array() else { continue };
            for item in items {
                if let Some(name) = item.as_str() {
                    load_directory(result, &current.join(name), source_dir)?;
                }
            }
            continue;
        }

        let Ok(entry) = serde_json::from_value::<ProjectEntry>(value) else { continue };
        let Some(kind) = kind_from_str(&entry.kind) else { continue };
        if entry.sources.is_empty() {
            continue;
        }
        let project = Project::new(key, kind);
        let sources = entry.sources.into_iter().map(PathBuf::from).collect();
        result.insert(project, ProjectSetup { subdir: subdir.clone(), sources });
    }

    Ok(())
}

/// Loads every `sources.json` under `source_dir`, recursing through
/// `.dirs` entries, and returns the flattened project → setup map.
pub fn load(source_dir: &Path) -> Result<BTreeMap<Project, ProjectSetup>> {
    let mut result = BTreeMap::new();
    load_directory(&mut result, source_dir, source_dir)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_a_single_project_with_no_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("sources.json"),
            r#"{"app": {"type": "executable", "sources": ["main.cc"]}}"#,
        )
        .unwrap();

        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        let (project, setup) = loaded.iter().next().unwrap();
        assert_eq!(project.name, "app");
        assert_eq!(project.kind, ProjectKind::Executable);
        assert_eq!(setup.subdir, PathBuf::new());
        assert_eq!(setup.sources, vec![PathBuf::from("main.cc")]);
    }

    #[test]
    fn recurses_through_dirs_entries_with_relative_subdir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sources.json"), r#"{".dirs": ["lib"]}"#).unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(
            dir.path().join("lib/sources.json"),
            r#"{"core": {"type": "static", "sources": ["a.cc", "b.cc"]}}"#,
        )
        .unwrap();

        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        let (project, setup) = loaded.iter().next().unwrap();
        assert_eq!(project.name, "core");
        assert_eq!(setup.subdir, PathBuf::from("lib"));
    }

    #[test]
    fn entries_with_an_unrecognized_type_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("sources.json"),
            r#"{"weird": {"type": "header-only", "sources": ["x.hh"]}}"#,
        )
        .unwrap();
        let loaded = load(dir.path()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn entries_with_empty_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("sources.json"),
            r#"{"empty": {"type": "executable", "sources": []}}"#,
        )
        .unwrap();
        let loaded = load(dir.path()).unwrap();
        assert!(loaded.is_empty());
    }
}
