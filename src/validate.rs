//! Pre-flight validation of document paths.
//!
//! Every import/export runs its target through [`validate_path`] before the
//! store or the document is touched, so permission problems surface as a
//! clean error instead of half-way through an operation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extension every interchange document carries.
pub const XML_EXTENSION: &str = ".xml";

/// Whether a path will be read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    Read,
    Write,
}

/// Reasons a document path is unusable.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("No path specified")]
    Empty,

    #[error("Invalid path (filesystem root): {0}")]
    Root(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Path is a directory, not a file: {}", .0.display())]
    IsDirectory(PathBuf),

    #[error("No read permission: {}: {source}", path.display())]
    NotReadable { path: PathBuf, source: io::Error },

    #[error("Could not create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("No write permission in {}: {source}", path.display())]
    NotWritable { path: PathBuf, source: io::Error },

    #[error("No permission to overwrite: {}", .0.display())]
    NotOverwritable(PathBuf),
}

impl PathError {
    /// Remediation shown in error reports.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Empty | Self::Root(_) => {
                "Give a full path including the file name, e.g. ~/HelpHub/export/clientes/clientes.xml"
            }
            Self::NotFound(_) | Self::IsDirectory(_) | Self::NotReadable { .. } => {
                "Check that the file exists and that you have read permission"
            }
            Self::CreateDir { .. } | Self::NotWritable { .. } | Self::NotOverwritable(_) => {
                "Check that you have write permission in the target directory"
            }
        }
    }
}

/// Validate a document path for reading or writing.
///
/// Returns the normalized path (with `.xml` appended when missing).
///
/// In write mode the parent directory is created if needed and probed with a
/// throwaway file; an existing target must be writable.
///
/// # Errors
///
/// Returns a [`PathError`] describing why the path cannot be used.
pub fn validate_path(raw: &str, mode: PathMode) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }
    if is_root(trimmed) {
        return Err(PathError::Root(trimmed.to_string()));
    }

    let path = with_extension(trimmed, XML_EXTENSION);

    match mode {
        PathMode::Read => check_readable(&path)?,
        PathMode::Write => check_writable(&path)?,
    }

    Ok(path)
}

/// Append `ext` unless the path already ends with it (case-insensitive).
#[must_use]
pub fn with_extension(raw: &str, ext: &str) -> PathBuf {
    if raw.to_lowercase().ends_with(&ext.to_lowercase()) {
        PathBuf::from(raw)
    } else {
        PathBuf::from(format!("{raw}{ext}"))
    }
}

/// `/`, `\`, and bare drive roots such as `C:` or `c:/`.
fn is_root(raw: &str) -> bool {
    if raw == "/" || raw == "\\" {
        return true;
    }

    let bytes = raw.as_bytes();
    let drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    drive && (bytes.len() == 2 || (bytes.len() == 3 && matches!(bytes[2], b'/' | b'\\')))
}

fn check_readable(path: &Path) -> Result<(), PathError> {
    if !path.exists() {
        return Err(PathError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(PathError::IsDirectory(path.to_path_buf()));
    }
    File::open(path).map_err(|source| PathError::NotReadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn check_writable(path: &Path) -> Result<(), PathError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|source| PathError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "created export directory");
    }

    probe_directory(&dir).map_err(|source| PathError::NotWritable { path: dir, source })?;

    if path.exists() {
        if path.is_dir() {
            return Err(PathError::IsDirectory(path.to_path_buf()));
        }
        // Opening without truncation leaves the current content intact.
        OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|_| PathError::NotOverwritable(path.to_path_buf()))?;
    }

    Ok(())
}

/// Write and remove a temporary file to prove the directory accepts writes.
fn probe_directory(dir: &Path) -> io::Result<()> {
    let probe = dir.join(format!(".hhsync-probe-{}.tmp", uuid::Uuid::new_v4().simple()));
    {
        let mut file = File::create(&probe)?;
        file.write_all(b"probe")?;
    }
    fs::remove_file(&probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_appended_when_missing() {
        assert_eq!(with_extension("report", XML_EXTENSION), PathBuf::from("report.xml"));
        assert_eq!(with_extension("REPORT.XML", XML_EXTENSION), PathBuf::from("REPORT.XML"));
        assert_eq!(with_extension("dir/a.xml", XML_EXTENSION), PathBuf::from("dir/a.xml"));
    }

    #[test]
    fn test_rejects_empty_and_root() {
        assert!(matches!(validate_path("", PathMode::Write), Err(PathError::Empty)));
        assert!(matches!(validate_path("   ", PathMode::Read), Err(PathError::Empty)));
        for root in ["/", "\\", "c:", "C:/", "c:\\"] {
            assert!(
                matches!(validate_path(root, PathMode::Write), Err(PathError::Root(_))),
                "{root} should be rejected"
            );
        }
    }

    #[test]
    fn test_is_root() {
        assert!(is_root("D:"));
        assert!(!is_root("D:/export"));
        assert!(!is_root("report"));
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.xml");
        let err = validate_path(missing.to_str().unwrap(), PathMode::Read).unwrap_err();
        assert!(matches!(err, PathError::NotFound(_)));
    }

    #[test]
    fn test_read_existing_file_normalizes() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("clientes.xml");
        fs::write(&file, "<clientes/>").unwrap();

        let raw = temp_dir.path().join("clientes");
        let path = validate_path(raw.to_str().unwrap(), PathMode::Read).unwrap();
        assert_eq!(path, file);
    }

    #[test]
    fn test_read_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("folder.xml");
        fs::create_dir(&dir).unwrap();
        let err = validate_path(dir.to_str().unwrap(), PathMode::Read).unwrap_err();
        assert!(matches!(err, PathError::IsDirectory(_)));
    }

    #[test]
    fn test_write_creates_directory_and_cleans_probe() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("export").join("clientes").join("report");

        let path = validate_path(target.to_str().unwrap(), PathMode::Write).unwrap();
        assert_eq!(path.file_name().unwrap(), "report.xml");

        let dir = temp_dir.path().join("export").join("clientes");
        assert!(dir.is_dir());
        // Neither the probe nor the target is left behind
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_write_allows_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("chamados.xml");
        fs::write(&file, "old").unwrap();

        let path = validate_path(file.to_str().unwrap(), PathMode::Write).unwrap();
        assert_eq!(path, file);
        assert_eq!(fs::read_to_string(&file).unwrap(), "old");
    }
}
