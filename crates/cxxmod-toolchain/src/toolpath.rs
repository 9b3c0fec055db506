//! Tool path resolution, grounded on `original_source/src/env/path.cc`
//! (`callable`/`fullpath`/`paths::which`/`paths::parser::find`). `paths`
//! there carries `{cxx, root, triple, suffix, is_gcc}`, derived once from
//! the resolved compiler path by walking its symlink chain and matching
//! each hop's filename against a known compiler stem (`break_triple`);
//! `which(tool)` then tries a 7-candidate ladder rooted at that directory
//! before falling back to a full `PATH` search.
//!
//! `break_triple` in the original is handed the *expected* bare tool name
//! by its caller (the compiler-detection code already knows whether it's
//! looking at "g++" or "clang++"). This crate has no such side-channel at
//! the point a command template needs an auxiliary tool's path, so
//! `infer_root` instead recognizes the bare compiler stem directly out of
//! a closed list (`KNOWN_COMPILER_STEMS`) rather than taking it as a
//! parameter.

use std::env;
use std::path::{Path, PathBuf};

const KNOWN_COMPILER_STEMS: &[(&str, bool)] =
    &[("g++", true), ("gcc", true), ("clang++", false), ("clang", false), ("cl", false)];

fn search_path() -> Vec<PathBuf> {
    let Some(path) = env::var_os("PATH") else {
        return Vec::new();
    };
    env::split_paths(&path).collect()
}

fn pathext_list() -> Vec<String> {
    env::var_os("PATHEXT")
        .map(|v| env::split_paths(&v).filter_map(|p| p.to_str().map(str::to_lowercase)).collect())
        .unwrap_or_default()
}

fn is_regular_file(path: &Path) -> bool {
    // `Path::metadata` follows symlinks (like `fs::status` in the
    // original), so a resolved tool may be reached through any number of
    // symlink hops without extra handling here.
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

/// `callable(path)`: `path` itself if it names a regular file, else
/// `path` with each `PATHEXT` extension appended in turn, first match wins.
fn callable(path: &Path) -> Option<PathBuf> {
    if is_regular_file(path) {
        return Some(path.to_path_buf());
    }
    let base = path.as_os_str().to_os_string();
    for ext in pathext_list() {
        let mut with_ext = base.clone();
        with_ext.push(&ext);
        let candidate = PathBuf::from(with_ext);
        if is_regular_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// True if `prog` contains a path separator and should be used verbatim
/// rather than searched for on `PATH`.
fn looks_like_a_path(prog: &str) -> bool {
    prog.contains('/') || prog.contains(std::path::MAIN_SEPARATOR)
}

/// `fullpath(prog)`: verbatim if `prog` is already a path, else the first
/// `callable` match across every `PATH` directory, else `prog` unchanged.
fn fullpath(prog: &str, dirs: &[PathBuf]) -> PathBuf {
    if looks_like_a_path(prog) {
        return PathBuf::from(prog);
    }
    for dir in dirs {
        if let Some(found) = callable(&dir.join(prog)) {
            return found;
        }
    }
    PathBuf::from(prog)
}

fn strip_pathext(filename: &str) -> &str {
    let lower = filename.to_lowercase();
    for ext in pathext_list() {
        if lower.ends_with(&ext) {
            return &filename[..filename.len() - ext.len()];
        }
    }
    filename
}

/// Splits `stem` on '-' up to the first 3 dashes, the same bound
/// `break_triple` uses, returning `(triple, remainder)` only when exactly
/// 3 dashes were found.
fn split_triple(stem: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = stem.splitn(4, '-').collect();
    if parts.len() == 4 {
        Some((parts[..3].join("-"), parts[3].to_string()))
    } else {
        None
    }
}

/// Matches `name` against a known compiler stem, bare or
/// version-suffixed (`g++-13`), returning the major version digits and
/// whether the match was GCC-flavored.
fn match_known_compiler(name: &str) -> Option<(Option<String>, bool)> {
    for (bare, is_gcc) in KNOWN_COMPILER_STEMS {
        if name == *bare {
            return Some((None, *is_gcc));
        }
        if let Some(rest) = name.strip_prefix(bare).and_then(|r| r.strip_prefix('-')) {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return Some((Some(rest.to_string()), *is_gcc));
            }
        }
    }
    None
}

/// The root directory, GNU target triple, major-version suffix, and
/// GCC-ness inferred from a resolved compiler path — the same
/// `{root, triple, suffix, is_gcc}` a `paths::which` ladder is rooted at.
#[derive(Debug, Clone, Default)]
pub struct ToolRoot {
    pub root: Option<PathBuf>,
    pub triple: Option<String>,
    pub suffix: Option<String>,
    pub is_gcc: bool,
}

/// Infers a `ToolRoot` from a resolved compiler path by inspecting its
/// own filename (stripped of any `PATHEXT` extension): first against the
/// bare/versioned compiler stem directly, then, if that fails, against a
/// `<triple>-<stem>` split.
pub fn infer_root(cxx: &Path) -> ToolRoot {
    let root = cxx.parent().map(Path::to_path_buf);
    let filename = cxx.file_name().and_then(|f| f.to_str()).unwrap_or_default();
    let stem = strip_pathext(filename);

    if let Some((suffix, is_gcc)) = match_known_compiler(stem) {
        return ToolRoot { root, triple: None, suffix, is_gcc };
    }
    if let Some((triple, rest)) = split_triple(stem) {
        if let Some((suffix, is_gcc)) = match_known_compiler(&rest) {
            return ToolRoot { root, triple: Some(triple), suffix, is_gcc };
        }
    }
    ToolRoot { root, triple: None, suffix: None, is_gcc: false }
}

/// Walks `paths::which`'s 7-candidate ladder for `tool`, rooted at
/// `info`: `<triple>-gcc-<tool>-<ver>` (GCC only), `<triple>-<tool>-<ver>`,
/// `<triple>-gcc-<tool>` (GCC only), `<triple>-<tool>`, `<tool>-<ver>`,
/// `<tool>` — each guarded on the triple/version actually being known —
/// falling back to a full `PATH` search (`fullpath`) if nothing under
/// `info.root` exists.
pub fn resolve_tool_rooted(tool: &str, info: &ToolRoot) -> PathBuf {
    if let Some(root) = &info.root {
        let mut candidates: Vec<PathBuf> = Vec::with_capacity(6);
        if let (true, Some(triple), Some(ver)) = (info.is_gcc, &info.triple, &info.suffix) {
            candidates.push(root.join(format!("{triple}-gcc-{tool}-{ver}")));
        }
        if let (Some(triple), Some(ver)) = (&info.triple, &info.suffix) {
            candidates.push(root.join(format!("{triple}-{tool}-{ver}")));
        }
        if let (true, Some(triple)) = (info.is_gcc, &info.triple) {
            candidates.push(root.join(format!("{triple}-gcc-{tool}")));
        }
        if let Some(triple) = &info.triple {
            candidates.push(root.join(format!("{triple}-{tool}")));
        }
        if let Some(ver) = &info.suffix {
            candidates.push(root.join(format!("{tool}-{ver}")));
        }
        candidates.push(root.join(tool));

        for candidate in candidates {
            if let Some(found) = callable(&candidate) {
                log::debug!("resolved tool {tool:?} to {}", found.display());
                return found;
            }
        }
    }

    let found = fullpath(tool, &search_path());
    if found == PathBuf::from(tool) && !looks_like_a_path(tool) {
        log::debug!("no candidate for {tool:?} found on PATH; falling back to the plain name");
    } else {
        log::debug!("resolved tool {tool:?} to {}", found.display());
    }
    found
}

/// Resolves a bare tool name (typically the main compiler itself) with
/// no known root/triple, matching `env::which`'s direct `fullpath` call.
pub fn resolve_tool(tool: &str) -> PathBuf {
    resolve_tool_rooted(tool, &ToolRoot::default())
}
