//! Discovers a compiler's built-in include search path by running its
//! descriptor's recipe and scraping the marker-delimited directory list
//! out of the response, grounded on the `<include-dirs>` element of
//! `original_source/src/xml/types.hh` (`include_dirs{output,filter_start,
//! filter_stop,filter}`).

use crate::descriptor::{CommandTemplate, OutputStream, TemplateContext};
use crate::proc::{run_with_stdin, Captured};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Splits `recipe` into a program plus arguments by whitespace, since the
/// rendered command is a single shell-style line.
fn split_command(rendered: &str) -> Option<(String, Vec<String>)> {
    let mut parts = rendered.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Runs the include-dirs recipe and returns the directories named
/// between its `start` and `stop` markers in the configured stream.
pub fn locate_include_dirs(
    recipe_template: &CommandTemplate,
    start: &str,
    stop: &str,
    stream: OutputStream,
    cxx: &Path,
) -> Result<Vec<PathBuf>> {
    let ctx = TemplateContext {
        cxx: cxx.display().to_string(),
        ..Default::default()
    };
    let rendered = recipe_template.render(&ctx);
    let Some((program, args)) = split_command(&rendered) else {
        return Ok(Vec::new());
    };
    let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
    let captured = run_with_stdin(Path::new(&program), &args_ref, b"")?;
    Ok(extract_include_dirs(&captured, start, stop, stream))
}

fn extract_include_dirs(captured: &Captured, start: &str, stop: &str, stream: OutputStream) -> Vec<PathBuf> {
    let text = match stream {
        OutputStream::Stdout => &captured.stdout,
        OutputStream::Stderr => &captured.stderr,
    };

    let mut dirs = Vec::new();
    let mut inside = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if !inside {
            if trimmed == start {
                inside = true;
            }
            continue;
        }
        if trimmed == stop {
            break;
        }
        if !trimmed.is_empty() {
            dirs.push(PathBuf::from(trimmed));
        }
    }
    dirs
}

/// Spawns `program` with no stdin and captures its output; a thin
/// convenience used when a recipe needs no synthetic input file at all.
pub fn run_bare(program: &str, args: &[&str]) -> Result<Captured> {
    let output = Command::new(program).args(args).output()?;
    Ok(Captured {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(stderr: &str) -> Captured {
        Captured {
            success: true,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn extracts_directories_between_markers() {
        let c = captured("ignore me\n#include <...> search starts here:\n /usr/include\n /usr/local/include\nEnd of search list.\ntrailer\n");
        let dirs = extract_include_dirs(&c, "#include <...> search starts here:", "End of search list.", OutputStream::Stderr);
        assert_eq!(dirs, vec![PathBuf::from("/usr/include"), PathBuf::from("/usr/local/include")]);
    }

    #[test]
    fn missing_start_marker_yields_no_directories() {
        let c = captured("nothing relevant here\n");
        let dirs = extract_include_dirs(&c, "start", "stop", OutputStream::Stderr);
        assert!(dirs.is_empty());
    }

    #[test]
    fn split_command_separates_program_from_arguments() {
        let (program, args) = split_command("c++ -E -Wp,-v -xc++ -").unwrap();
        assert_eq!(program, "c++");
        assert_eq!(args, vec!["-E", "-Wp,-v", "-xc++", "-"]);
    }
}
