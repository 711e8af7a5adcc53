//! External tool invocation shared by the OCR and PDF strategies.

use std::ffi::OsStr;
use std::process::{Output, Stdio};

use tokio::process::Command;

use super::strategy::Diagnostic;

/// Run `program` to completion and return its output.
///
/// The child is killed if the returned future is dropped, so a timeout
/// around this call never leaves an orphaned process.
pub async fn run_tool<I, S>(program: &str, args: I) -> Result<Output, Diagnostic>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| Diagnostic::Spawn {
            tool: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Diagnostic::NonZeroExit {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr: truncate(stderr.trim(), 500),
        });
    }

    Ok(output)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
