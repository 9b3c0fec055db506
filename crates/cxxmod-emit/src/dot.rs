//! Graphviz dependency-graph emitter, grounded on
//! `original_source/src/generators/dot.cc`.

use cxxmod_graph::Graph;
use cxxmod_model::{Artifact, RuleKind, Target};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;

fn shape_for(rule: Option<RuleKind>) -> &'static str {
    match rule {
        None => "house",
        Some(RuleKind::EmitBmi) => "hexagon",
        Some(RuleKind::LinkStatic) => "septagon",
        Some(RuleKind::LinkSo) => "pentagon",
        Some(RuleKind::LinkMod) => "octagon",
        Some(RuleKind::LinkExecutable) => "rect",
        _ => "",
    }
}

fn printable(a: &Artifact) -> String {
    match a {
        Artifact::FileRef { path, .. } => path.display().to_string(),
        Artifact::ModRef { module, .. } => module.to_string(),
    }
}

fn produces(target: &Target, artifact: &Artifact) -> bool {
    &target.main_output == artifact || target.outputs.implicit.contains(artifact) || target.outputs.order.contains(artifact)
        || target.outputs.expl.contains(artifact)
}

/// Renders the target graph as a `digraph {}` body; nodes are numbered
/// in target order so the output is deterministic across runs.
pub fn generate(graph: &Graph) -> String {
    let mut out = String::new();
    out.push_str("digraph {\n");
    out.push_str("    node [fontname=\"Atkinson Hyperlegible\"]\n");
    out.push_str("    edge [fontname=\"Atkinson Hyperlegible\"]\n\n");

    let mut ignored: BTreeSet<Artifact> = BTreeSet::new();
    for target in &graph.targets {
        if target.rule.map(RuleKind::is_ignorable).unwrap_or(false) {
            ignored.insert(target.main_output.clone());
            ignored.extend(target.outputs.expl.iter().cloned());
            ignored.extend(target.outputs.implicit.iter().cloned());
            ignored.extend(target.outputs.order.iter().cloned());
        }
    }

    let mut node_ids: BTreeMap<Artifact, String> = BTreeMap::new();
    let mut counter = 0usize;
    for target in &graph.targets {
        if target.rule.map(RuleKind::is_ignorable).unwrap_or(false) {
            continue;
        }
        counter += 1;
        let id = format!("node{counter}");
        let shape = shape_for(target.rule);
        if shape.is_empty() {
            let _ = writeln!(out, "    {id} [label=\"{}\"]", printable(&target.main_output));
        } else {
            let _ = writeln!(out, "    {id} [label=\"{}\" shape=\"{shape}\"]", printable(&target.main_output));
        }
        node_ids.insert(target.main_output.clone(), id);
    }

    for target in &graph.targets {
        if target.rule.map(RuleKind::is_ignorable).unwrap_or(false) {
            continue;
        }
        let Some(src) = node_ids.get(&target.main_output) else { continue };

        let mut first = true;
        for input in target.inputs.expl.iter().chain(target.inputs.implicit.iter()) {
            if ignored.contains(input) {
                continue;
            }
            let Some(dst) = node_ids.get(input) else { continue };
            if first {
                first = false;
                let _ = write!(out, "    {src} -> {{");
            }
            let _ = write!(out, " {dst}");
        }
        if !first {
            out.push_str(" }");
            if let Some(edge) = &target.edge {
                let _ = write!(out, " [label=\"{edge}\"]");
            }
            out.push('\n');
        }

        first = true;
        for input in &target.inputs.order {
            if ignored.contains(input) {
                continue;
            }
            let dst = node_ids.get(input).cloned().or_else(|| {
                graph.targets.iter().find(|t| produces(t, input)).and_then(|t| node_ids.get(&t.main_output).cloned())
            });
            let Some(dst) = dst else { continue };
            if first {
                first = false;
                let _ = write!(out, "    {src} -> {{");
            }
            let _ = write!(out, " {dst}");
        }
        if !first {
            out.push_str(" } [style=dashed]\n");
        }
    }

    out.push_str("}\n");
    out
}
