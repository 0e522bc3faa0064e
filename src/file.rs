// src/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Write a whole output file in one go, creating its parent directory first.
/// Returns the path written to.
pub fn write_output(path: &Path, contents: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    fs::write(path, contents).map_err(|source| Error::Write { path: path.to_path_buf(), source })?;
    logf!("wrote {}", path.display());
    Ok(path.to_path_buf())
}

/// `-o out/` (or an existing directory) means "default file name inside that directory".
pub fn resolve_out_path(user_o: &Path, default_filename: &str) -> PathBuf {
    if looks_like_dir_hint(user_o) || user_o.is_dir() {
        user_o.join(default_filename)
    } else {
        user_o.to_path_buf()
    }
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| Error::Write { path: dir.to_path_buf(), source })?;
    }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}

/// File name part of a path, for headers and messages.
pub fn display_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}
