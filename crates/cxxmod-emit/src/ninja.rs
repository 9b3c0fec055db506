//! Ninja build-file emitter, grounded on
//! `original_source/src/generators/ninja.cc`.

use crate::paths::resolve;
use cxxmod_graph::Graph;
use cxxmod_model::{Artifact, RuleKind, Target};
use cxxmod_toolchain::{CommandTemplate, Descriptor, TemplateContext};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

fn rule_name(rule: RuleKind) -> &'static str {
    match rule {
        RuleKind::Mkdir => "",
        RuleKind::Compile => "cc",
        RuleKind::EmitBmi => "bmi",
        RuleKind::EmitInclude => "include-scan",
        RuleKind::LinkStatic => "ar",
        RuleKind::LinkSo => "link-so",
        RuleKind::LinkMod => "link-mod",
        RuleKind::LinkExecutable => "link-exe",
    }
}

fn render_rule_commands(templates: &[CommandTemplate], cxx: &str, tool_paths: &std::collections::BTreeMap<String, String>) -> String {
    let ctx = TemplateContext {
        cxx: cxx.to_string(),
        input: "$in".to_string(),
        output: "$out".to_string(),
        main_output: "$MAIN_OUTPUT".to_string(),
        link_flags: "$LINK_FLAGS".to_string(),
        link_path: "$LINK_PATH".to_string(),
        link_library: "$LINK_LIBRARY".to_string(),
        defines: "$DEFINES".to_string(),
        cflags: "$CFLAGS".to_string(),
        cxxflags: "$CXXFLAGS".to_string(),
        tool_paths: tool_paths.clone(),
    };
    templates.iter().map(|c| c.render(&ctx)).collect::<Vec<_>>().join(" && ")
}

fn format_artifact(a: &Artifact, back_to_sources: &Path) -> String {
    resolve(a, back_to_sources).display().to_string()
}

/// The auxiliary tools (`<tool which="..."/>` template parts) GCC/Clang
/// descriptors' static-lib link rule references, resolved through the
/// same root/triple ladder the compiler itself was found on.
fn resolve_tool_paths(cxx: &str) -> std::collections::BTreeMap<String, String> {
    let info = cxxmod_toolchain::toolpath::infer_root(Path::new(cxx));
    ["ar", "ranlib"]
        .iter()
        .map(|tool| {
            let resolved = cxxmod_toolchain::toolpath::resolve_tool_rooted(tool, &info);
            (tool.to_string(), resolved.display().to_string())
        })
        .collect()
}

/// Writes `build.ninja` into `builddir`, rebasing source inputs through
/// `back_to_sources` (the relative path from the build directory back
/// to the project's source tree).
pub fn generate(graph: &Graph, descriptor: &Descriptor, cxx: &str, back_to_sources: &Path) -> String {
    let mut out = String::new();
    out.push_str("CXXFLAGS = -std=c++20 -O0 -g\n\n");

    let tool_paths = resolve_tool_paths(cxx);
    for rule in &graph.rules_needed {
        let name = rule_name(*rule);
        if name.is_empty() {
            continue;
        }
        let Some(templates) = descriptor.rules.get(rule) else { continue };
        let _ = writeln!(out, "rule {name}");
        let _ = writeln!(out, "    command = {}", render_rule_commands(templates, cxx, &tool_paths));
        out.push('\n');
    }

    let mut ignored: BTreeSet<Artifact> = BTreeSet::new();
    for target in &graph.targets {
        if target.rule.map(RuleKind::is_ignorable).unwrap_or(false) {
            ignored.insert(target.main_output.clone());
            ignored.extend(target.outputs.expl.iter().cloned());
            ignored.extend(target.outputs.implicit.iter().cloned());
            ignored.extend(target.outputs.order.iter().cloned());
        }
    }

    for target in &graph.targets {
        let Some(rule) = target.rule else { continue };
        let name = rule_name(rule);
        if name.is_empty() {
            continue;
        }

        let mut line = format!("build {}", format_artifact(&target.main_output, back_to_sources));
        for out_artifact in &target.outputs.expl {
            let _ = write!(line, " {}", format_artifact(out_artifact, back_to_sources));
        }
        if !target.outputs.implicit.is_empty() || !target.outputs.order.is_empty() {
            line.push_str(" |");
        }
        for out_artifact in target.outputs.implicit.iter().chain(target.outputs.order.iter()) {
            let _ = write!(line, " {}", format_artifact(out_artifact, back_to_sources));
        }

        let _ = write!(line, ": {name}");

        for input in &target.inputs.expl {
            if ignored.contains(input) {
                continue;
            }
            let _ = write!(line, " {}", format_artifact(input, back_to_sources));
        }
        let mut first = true;
        for input in &target.inputs.implicit {
            if ignored.contains(input) {
                continue;
            }
            if first {
                first = false;
                line.push_str(" |");
            }
            let _ = write!(line, " {}", format_artifact(input, back_to_sources));
        }
        first = true;
        for input in &target.inputs.order {
            if ignored.contains(input) {
                continue;
            }
            if first {
                first = false;
                line.push_str(" ||");
            }
            let _ = write!(line, " {}", format_artifact(input, back_to_sources));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}
