//! Atomic file operations for sync.
//!
//! Documents are built in memory and written in one go through a temp file,
//! so a failed export never leaves a truncated document behind.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::sync::document::{self, Element};
use crate::sync::types::{SyncError, SyncResult};

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary sibling file (`<name>.tmp`)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> SyncResult<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let written = (|| -> std::io::Result<()> {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()
    })();

    if let Err(e) = written.and_then(|()| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(SyncError::Io(e));
    }

    Ok(())
}

/// Serialize `root` and write it atomically to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_document(path: &Path, root: &Element) -> SyncResult<()> {
    let xml = document::to_xml(root)?;
    atomic_write(path, &xml)
}

/// Read and parse the document at `path`.
///
/// # Errors
///
/// Returns [`SyncError::StructuralParse`] if the file is not UTF-8 or not
/// well-formed, or an IO error if it cannot be read.
pub fn read_document(path: &Path) -> SyncResult<Element> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| SyncError::StructuralParse(format!("document is not valid UTF-8: {e}")))?;
    document::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.xml");

        atomic_write(&path, "<a/>\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "<a/>\n");
        assert!(!temp_dir.path().join("test.xml.tmp").exists());
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.xml");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_document_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clientes.xml");

        let mut root = Element::new("clientes");
        root.push(Element::leaf("cliente", Some("x")));
        write_document(&path, &root).unwrap();

        let read = read_document(&path).unwrap();
        assert_eq!(read.name, "clientes");
        assert_eq!(read.field("cliente"), Some("x"));
    }

    #[test]
    fn test_read_non_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.xml");
        fs::write(&path, [0x3c, 0x61, 0xff, 0x3e]).unwrap();

        assert!(matches!(read_document(&path), Err(SyncError::StructuralParse(_))));
    }
}
