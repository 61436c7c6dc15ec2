use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Write;
use std::process::{Command, Stdio};

/// How the text reached the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyMethod {
    /// Piped into a platform clipboard tool
    Tool(String),
    /// Written as an OSC 52 terminal escape
    Terminal,
}

/// Clipboard programs to try, in order
#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(windows)]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("clip.exe", &[]), ("clip", &[])];

#[cfg(not(any(target_os = "macos", windows)))]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

/// Copy text to the system clipboard, falling back to the terminal
/// escape sequence when no clipboard tool works.
pub fn copy_text(text: &str) -> Result<CopyMethod> {
    for (tool, args) in CLIPBOARD_TOOLS {
        let Ok(path) = which::which(tool) else {
            continue;
        };
        match pipe_into(&path, args, text) {
            Ok(()) => return Ok(CopyMethod::Tool(tool.to_string())),
            Err(e) => tracing::debug!("Clipboard tool {} failed: {:#}", tool, e),
        }
    }

    let mut stderr = std::io::stderr();
    stderr
        .write_all(osc52_sequence(text).as_bytes())
        .and_then(|_| stderr.flush())
        .context("Failed to write clipboard escape sequence")?;
    Ok(CopyMethod::Terminal)
}

fn pipe_into(program: &std::path::Path, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {}", program.display()))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(e).with_context(|| format!("Failed to write to {}", program.display()));
        }
    }

    let status = child.wait()?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", program.display(), status);
    }
    Ok(())
}

/// OSC 52 "set clipboard" escape for `text`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
