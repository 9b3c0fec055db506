//! Compiler identification by synthetic preprocessing block, grounded on
//! `original_source/src/compiler.cc::compiler_type`: a chain of
//! `#if`/`#elif` guards, one per registered descriptor, each followed by
//! the descriptor's name and version macros, is fed through the compiler
//! in preprocess-only mode and the surviving output identifies which
//! branch fired.

use crate::descriptor::Descriptor;

/// Builds the synthetic preprocessing source to pipe into the compiler's
/// standard input under `-E -xc++ -`.
pub fn detection_source(descriptors: &[Descriptor]) -> String {
    let mut out = String::new();
    let mut control = "#if";
    for d in descriptors {
        out.push_str(control);
        out.push(' ');
        out.push_str(&d.ident.guard);
        out.push('\n');
        out.push_str(&d.ident.name);
        out.push(' ');
        out.push_str(&d.ident.version);
        out.push('\n');
        control = "#elif";
    }
    if !descriptors.is_empty() {
        out.push_str("#endif\n");
    }
    out
}

/// Parses the preprocessor's response: strips any remaining `#`-line
/// fragments and blank lines, then splits the first non-empty line into
/// the detected compiler name and its macro-expansion remainder.
pub fn parse_detection_output(text: &str) -> Option<(String, String)> {
    let mut cleaned = String::new();
    for line in text.split('\n') {
        let stripped = line.split('#').next().unwrap_or("").trim();
        if !stripped.is_empty() {
            cleaned.push_str(stripped);
            cleaned.push('\n');
        }
    }
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let split_at = cleaned.find(char::is_whitespace).unwrap_or(cleaned.len());
    let name = cleaned[..split_at].to_string();
    let rest = cleaned[split_at..].trim_start().to_string();
    if name.is_empty() {
        return None;
    }
    Some((name, rest))
}

/// Finds the descriptor whose `ident.name` matches the detected name.
pub fn match_descriptor<'a>(descriptors: &'a [Descriptor], detected_name: &str) -> Option<&'a Descriptor> {
    descriptors.iter().find(|d| d.ident.name == detected_name)
}
