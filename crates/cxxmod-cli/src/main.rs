//! # cxxmod
//!
//! Command-line driver for the C++20-modules-aware build-graph generator.
//!
//! Loads `sources.json` project manifests from a source tree, detects the
//! local C++ toolchain, preprocesses and scans every source for module
//! declarations, synthesizes the target graph, and writes Ninja, MSBuild,
//! and/or Graphviz build artifacts.
//!
//! ```bash
//! # Generate build.ninja next to the source tree
//! cxxmod . --emit ninja
//!
//! # Generate every supported format into an explicit build directory
//! cxxmod ~/myproject --emit all --out ~/myproject/build
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cxxmod_emit::EmitFormat;
use std::path::{Path, PathBuf};

/// cxxmod - C++20-modules-aware Ninja/MSBuild/Graphviz build-graph generator.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source directory containing the project's `sources.json` manifests.
    #[arg(default_value = ".")]
    source_dir: String,

    /// Which back end(s) to render.
    ///
    /// Defaults to every format the detected compiler profile supports:
    /// Ninja and Graphviz always, MSBuild additionally when the profile is
    /// MSVC-flavored.
    #[arg(long, value_enum)]
    emit: Option<EmitArg>,

    /// Directory to write generated build artifacts into.
    ///
    /// Defaults to a `build` subdirectory next to the source tree.
    #[arg(long, value_name = "DIR")]
    out: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitArg {
    Ninja,
    Msbuild,
    Dot,
    All,
}

impl From<EmitArg> for EmitFormat {
    fn from(value: EmitArg) -> Self {
        match value {
            EmitArg::Ninja => EmitFormat::Ninja,
            EmitArg::Msbuild => EmitFormat::Msbuild,
            EmitArg::Dot => EmitFormat::Dot,
            EmitArg::All => EmitFormat::All,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(&args.source_dir, args.emit.map(EmitFormat::from), args.out.as_deref())
}

/// Relative path from `from` back to `to`, assuming both are absolute and
/// `from` is nested under (or equal to) a common ancestor of `to`; used to
/// rebase source-file references from the binary directory a back end
/// writes its output into.
fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from_comps: Vec<_> = from.components().collect();
    let to_comps: Vec<_> = to.components().collect();
    let common = from_comps.iter().zip(to_comps.iter()).take_while(|(a, b)| a == b).count();

    let mut result = PathBuf::new();
    for _ in common..from_comps.len() {
        result.push("..");
    }
    for comp in &to_comps[common..] {
        result.push(comp.as_os_str());
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

/// Formats to render when `--emit` wasn't given: Ninja and Graphviz always,
/// plus MSBuild when the detected profile is MSVC-flavored (matching the
/// original tool's default of generating every back end its detected
/// compiler profile supports).
fn default_formats(is_windows_like: bool) -> Vec<EmitFormat> {
    if is_windows_like {
        vec![EmitFormat::All]
    } else {
        vec![EmitFormat::Ninja, EmitFormat::Dot]
    }
}

fn run(source_dir: &str, format: Option<EmitFormat>, out: Option<&str>) -> Result<()> {
    let source_dir = Path::new(source_dir);
    if !source_dir.is_dir() {
        anyhow::bail!("source directory {} does not exist", source_dir.display());
    }

    let binary_dir = match out {
        Some(out) => PathBuf::from(out),
        None => source_dir.join("build"),
    };
    std::fs::create_dir_all(&binary_dir)
        .with_context(|| format!("cannot create binary directory {}", binary_dir.display()))?;

    log::info!("detecting toolchain");
    let toolchain = cxxmod_toolchain::detect_toolchain().context("toolchain detection failed")?;
    log::info!("detected {} ({})", toolchain.descriptor.ident.name, toolchain.cxx.display());

    let projects = cxxmod_analyze::project_loader::load(source_dir)
        .with_context(|| format!("failed to load project manifests under {}", source_dir.display()))?;
    log::info!("loaded {} project(s)", projects.len());

    let build = cxxmod_analyze::analyze(&projects, &toolchain, source_dir, &binary_dir).context("build analysis failed")?;

    let include_dirs = cxxmod_toolchain::discover_include_dirs(&toolchain).unwrap_or_else(|e| {
        log::warn!("include-path discovery failed: {e}; legacy-header imports will not be routed");
        Vec::new()
    });
    let graph = cxxmod_graph::synthesize(&build, &toolchain.descriptor, toolchain.profile, &include_dirs);
    log::info!("synthesized {} target(s)", graph.targets.len());

    let back_to_sources = relative_path(&build.binary_root, &build.source_root);
    let cxx = toolchain.cxx.display().to_string();

    let formats = match format {
        Some(f) => vec![f],
        None => default_formats(toolchain.profile.is_windows_like),
    };
    for format in formats {
        let rendered = cxxmod_emit::emit(format, &graph, &build, &toolchain.descriptor, &cxx, &back_to_sources);
        for file in rendered {
            let path = binary_dir.join(&file.filename);
            std::fs::write(&path, file.contents).with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
    }

    Ok(())
}
