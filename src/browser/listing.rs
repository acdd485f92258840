//! Directory snapshots for the file browser.

use std::fs;
use std::io;
use std::path::Path;

/// One row of a directory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub is_dir: bool,
    /// File whose name carries the active extension filter.
    pub matches: bool,
}

/// A directory snapshot: subdirectories first, then files matching the
/// extension filter, then the remaining files, each group sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    entries: Vec<ListEntry>,
}

impl Listing {
    /// Build a snapshot from raw directory and file names.
    #[must_use]
    pub fn new(mut directories: Vec<String>, files: Vec<String>, extension: Option<&str>) -> Self {
        directories.sort();

        let (mut matching, mut others): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|name| extension.is_some_and(|ext| has_extension(name, ext)));
        matching.sort();
        others.sort();

        let entries = directories
            .into_iter()
            .map(|name| ListEntry {
                name,
                is_dir: true,
                matches: false,
            })
            .chain(matching.into_iter().map(|name| ListEntry {
                name,
                is_dir: false,
                matches: true,
            }))
            .chain(others.into_iter().map(|name| ListEntry {
                name,
                is_dir: false,
                matches: false,
            }))
            .collect();

        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ListEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }
}

/// Case-insensitive suffix check, e.g. `REPORT.XML` against `.xml`.
#[must_use]
pub fn has_extension(name: &str, extension: &str) -> bool {
    name.to_lowercase().ends_with(&extension.to_lowercase())
}

/// Read access to directory contents.
pub trait DirectoryLister {
    /// Snapshot `dir`, ordering files by `extension` when given.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the directory cannot be read.
    fn list(&self, dir: &Path, extension: Option<&str>) -> io::Result<Listing>;
}

/// Lists the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, dir: &Path, extension: Option<&str>) -> io::Result<Listing> {
        let mut directories = Vec::new();
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let Ok(entry) = entry else { continue };
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follow symlinks; dangling ones are left out
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => directories.push(name),
                Ok(meta) if meta.is_file() => files.push(name),
                _ => {}
            }
        }

        Ok(Listing::new(directories, files, extension))
    }
}
