// OS folder integration: default output folder and "open in file browser"

use std::path::{Path, PathBuf};
use std::process::Command;

/// The user's documents folder, falling back to home, then the current directory.
pub fn default_output_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")).filter(|d| d.is_dir()))
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn opener() -> &'static str {
    if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Opens `dir` in the platform file browser without waiting for it to exit.
pub fn open_folder(dir: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(dir.is_dir(), "Please specify a valid folder path.");
    let program = opener();
    Command::new(program)
        .arg(dir)
        .spawn()
        .map_err(|e| anyhow::anyhow!("{} {}: {}", program, dir.display(), e))?;
    tracing::debug!(program, dir = %dir.display(), "opened folder");
    Ok(())
}
