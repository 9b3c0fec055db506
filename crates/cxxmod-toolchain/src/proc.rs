//! Process launcher wrapping `std::process::Command`, used both for
//! feeding synthetic sources through a compiler's preprocessor and for
//! running the include-path discovery recipe.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured output of a finished child process.
pub struct Captured {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `program args...`, writing `stdin` to the child then collecting
/// both output streams. Non-UTF8 bytes are replaced, matching the
/// teacher's habit of working in `String` once a process boundary has
/// been crossed.
pub fn run_with_stdin(program: &Path, args: &[&str], stdin: &[u8]) -> Result<Captured> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to launch {}", program.display()))?;

    child
        .stdin
        .take()
        .context("child process has no stdin handle")?
        .write_all(stdin)
        .with_context(|| format!("failed to write to {}'s stdin", program.display()))?;

    let output = child
        .wait_with_output()
        .with_context(|| format!("failed waiting for {}", program.display()))?;

    Ok(Captured {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs a preprocess-only invocation of `cxx` on `source`, returning the
/// raw preprocessed text. Mirrors `compiler_type`'s use of `-E -o- -xc++ -`.
pub fn preprocess(cxx: &Path, extra_args: &[&str], source: &[u8]) -> Result<String> {
    let mut args: Vec<&str> = vec!["-E", "-o-", "-xc++", "-"];
    args.extend_from_slice(extra_args);
    let captured = run_with_stdin(cxx, &args, source)?;
    if !captured.success {
        bail!("preprocessing with {} failed:\n{}", cxx.display(), captured.stderr);
    }
    Ok(captured.stdout)
}
