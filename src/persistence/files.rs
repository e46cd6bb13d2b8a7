use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the data directory, local or in the home directory
pub const TIDE_DIR: &str = ".tide";

/// Get the data directory - checks for a local .tide first, then falls back to ~/.tide
pub fn get_tide_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;

    if let Some(local_dir) = find_local_tide(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(TIDE_DIR))
}

/// Find a local .tide directory by walking up the directory tree
fn find_local_tide(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let tide_dir = current.join(TIDE_DIR);
        if tide_dir.is_dir() {
            return Some(tide_dir);
        }
        current = current.parent()?;
    }
}

/// Ensure the data directory exists
pub fn ensure_tide_dir() -> Result<PathBuf> {
    let dir = get_tide_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .tide directory inside `parent`
pub fn init_local_tide(parent: &Path) -> Result<PathBuf> {
    let tide_dir = parent.join(TIDE_DIR);

    if tide_dir.exists() {
        anyhow::bail!("Tide directory already exists: {}", tide_dir.display());
    }

    fs::create_dir_all(&tide_dir)
        .with_context(|| format!("Failed to create directory: {}", tide_dir.display()))?;

    Ok(tide_dir)
}

/// Path to the key/value store inside a data directory
pub fn store_file(dir: &Path) -> PathBuf {
    dir.join("store.json")
}

/// Path to settings.json inside a data directory
pub fn settings_file(dir: &Path) -> PathBuf {
    dir.join("settings.json")
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .context("File path has no parent directory")?;

    let mut temp_file = NamedTempFile::new_in(dir)
        .context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

/// Read file content, return empty string if file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}
