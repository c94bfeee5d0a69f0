use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;
use uuid::Uuid;

use crate::errors::DigestError;
use crate::utils::clipboard::ClipboardAccess;
use crate::views::render_summary_html;

/// Copies the digest text to the clipboard.
///
/// # Errors
///
/// Returns `ClipboardError` if the write is rejected.
pub fn copy_summary(clipboard: &mut dyn ClipboardAccess, summary: &str) -> Result<(), DigestError> {
    clipboard.write_text(summary)?;
    info!("Copied summary ({} characters) to clipboard", summary.len());
    Ok(())
}

/// Writes the HTML rendering of a digest into `dir` and returns the file path.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be written.
pub fn write_summary_html(dir: &Path, title: &str, summary: &str) -> Result<PathBuf, DigestError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("slack-digest-{}.html", Uuid::new_v4()));
    fs::write(&path, render_summary_html(title, summary))?;
    Ok(path)
}

/// Writes the digest as HTML to the temp directory and opens it with the platform opener.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be written or the opener cannot be launched.
pub fn open_in_browser(title: &str, summary: &str) -> Result<PathBuf, DigestError> {
    let path = write_summary_html(&std::env::temp_dir(), title, summary)?;

    let status = opener_command(&path).status()?;
    if !status.success() {
        return Err(DigestError::IoError(format!(
            "browser opener exited with {status} for {}",
            path.display()
        )));
    }
    info!("Opened {} in browser", path.display());
    Ok(path)
}

fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}
