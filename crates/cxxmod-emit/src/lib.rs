//! Back-end emitters: render a synthesized `Graph` into a build-system
//! format. Each format lives in its own module; `EmitFormat` is the
//! shared selector the CLI exposes as `--emit`.

pub mod dot;
pub mod msbuild;
pub mod ninja;
pub mod paths;

use cxxmod_graph::Graph;
use cxxmod_model::BuildInfo;
use cxxmod_toolchain::Descriptor;
use std::path::Path as StdPath;

/// Which back end(s) to render; mirrors the CLI's `--emit` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitFormat {
    Ninja,
    Dot,
    Msbuild,
    All,
}

impl EmitFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ninja" => Some(EmitFormat::Ninja),
            "dot" => Some(EmitFormat::Dot),
            "msbuild" => Some(EmitFormat::Msbuild),
            "all" => Some(EmitFormat::All),
            _ => None,
        }
    }
}

/// One rendered file: the name it should be written under, and its body.
pub struct Rendered {
    pub filename: String,
    pub contents: String,
}

/// Renders every format `format` selects, given the synthesized graph and
/// the build's project table (needed only by the MSBuild back end, which
/// emits one project file per project rather than one shared build file).
pub fn emit(
    format: EmitFormat,
    graph: &Graph,
    build: &BuildInfo,
    descriptor: &Descriptor,
    cxx: &str,
    back_to_sources: &StdPath,
) -> Vec<Rendered> {
    let mut out = Vec::new();
    let want_ninja = matches!(format, EmitFormat::Ninja | EmitFormat::All);
    let want_dot = matches!(format, EmitFormat::Dot | EmitFormat::All);
    let want_msbuild = matches!(format, EmitFormat::Msbuild | EmitFormat::All);
    log::debug!("rendering {format:?} ({} target(s))", graph.targets.len());

    if want_ninja {
        out.push(Rendered {
            filename: "build.ninja".to_string(),
            contents: ninja::generate(graph, descriptor, cxx, back_to_sources),
        });
    }
    if want_dot {
        out.push(Rendered {
            filename: "graph.dot".to_string(),
            contents: dot::generate(graph),
        });
    }
    if want_msbuild {
        for (prj, info) in &build.projects {
            out.push(Rendered {
                filename: format!("{}.vcxproj", prj.name),
                contents: msbuild::generate_project(prj, info, &build.binary_root, back_to_sources),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_every_known_keyword_and_rejects_others() {
        assert_eq!(EmitFormat::from_str("ninja"), Some(EmitFormat::Ninja));
        assert_eq!(EmitFormat::from_str("dot"), Some(EmitFormat::Dot));
        assert_eq!(EmitFormat::from_str("msbuild"), Some(EmitFormat::Msbuild));
        assert_eq!(EmitFormat::from_str("all"), Some(EmitFormat::All));
        assert_eq!(EmitFormat::from_str("bogus"), None);
    }

    #[test]
    fn emit_all_produces_ninja_dot_and_one_vcxproj_per_project() {
        let build = BuildInfo::new(std::path::PathBuf::from("/src"), std::path::PathBuf::from("/bin"));
        let graph = Graph::default();
        let descriptor = cxxmod_toolchain::descriptor::parse_descriptor(cxxmod_toolchain::descriptors::GCC_LIKE).unwrap();
        let rendered = emit(
            EmitFormat::All,
            &graph,
            &build,
            &descriptor,
            "c++",
            std::path::Path::new(".."),
        );
        assert!(rendered.iter().any(|r| r.filename == "build.ninja"));
        assert!(rendered.iter().any(|r| r.filename == "graph.dot"));
    }
}
