//! Configuration management.
//!
//! This module resolves where the record store lives and where documents
//! go by default, and bundles both into an [`AppConfig`] that is built once
//! at startup and passed by reference into every operation.
//!
//! # Store resolution
//!
//! 1. `--db` flag (or `HHSYNC_DB`, handled by clap). When given it is the
//!    only candidate.
//! 2. The conventional location next to the ticketing backend:
//!    `<exe dir>/../Programa de Chamados/backend/database.db`
//! 3. `./database.db`
//! 4. Interactive browsing (done by the shell, not here)

use std::path::{Path, PathBuf};

use crate::sync::EntityKind;

/// Conventional store file name.
pub const DB_FILE_NAME: &str = "database.db";

/// Store location relative to the directory holding the executable.
const BACKEND_RELATIVE_DB: [&str; 4] = ["..", "Programa de Chamados", "backend", DB_FILE_NAME];

/// Process-wide settings, fixed once the store is resolved.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Record store file.
    pub db_path: PathBuf,
    /// Directory under which default document paths are built.
    pub export_root: PathBuf,
}

impl AppConfig {
    /// Build a config for `db_path` with the default export root.
    #[must_use]
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            export_root: default_export_root(),
        }
    }

    /// Override the export root.
    #[must_use]
    pub fn with_export_root(mut self, export_root: PathBuf) -> Self {
        self.export_root = export_root;
        self
    }

    /// Default document path for an entity kind, e.g.
    /// `<root>/clientes/clientes.xml`.
    #[must_use]
    pub fn default_document(&self, kind: EntityKind) -> PathBuf {
        let name = kind.root_tag();
        self.export_root.join(name).join(format!("{name}.xml"))
    }
}

/// Default export root.
///
/// `HHSYNC_EXPORT_DIR` if set, otherwise `~/HelpHub/export`, otherwise
/// `./HelpHub/export` when no home directory is known.
#[must_use]
pub fn default_export_root() -> PathBuf {
    if let Ok(dir) = std::env::var("HHSYNC_EXPORT_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from("."), |b| b.home_dir().to_path_buf())
        .join("HelpHub")
        .join("export")
}

/// Candidate store paths in priority order.
///
/// An explicit path replaces the conventional locations.
#[must_use]
pub fn db_candidates(explicit_path: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit_path {
        return vec![path.to_path_buf()];
    }

    let mut candidates = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(BACKEND_RELATIVE_DB.iter().fold(exe_dir, |acc, part| acc.join(part)));
    }

    candidates.push(PathBuf::from(DB_FILE_NAME));
    candidates
}

/// Resolve the store path without user interaction.
///
/// Returns the first candidate that is an existing file.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    db_candidates(explicit_path)
        .into_iter()
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_is_the_only_candidate() {
        let explicit = PathBuf::from("/custom/path/helphub.db");
        assert_eq!(db_candidates(Some(&explicit)), vec![explicit]);
    }

    #[test]
    fn test_default_candidates_end_in_working_directory() {
        let candidates = db_candidates(None);
        assert_eq!(candidates.last(), Some(&PathBuf::from(DB_FILE_NAME)));
    }

    #[test]
    fn test_resolve_existing_explicit() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("store.db");
        std::fs::write(&db, b"").unwrap();

        assert_eq!(resolve_db_path(Some(&db)), Some(db));
    }

    #[test]
    fn test_missing_explicit_does_not_fall_back() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.db");
        assert_eq!(resolve_db_path(Some(&missing)), None);
    }

    #[test]
    fn test_default_document_paths() {
        let config =
            AppConfig::new(PathBuf::from("database.db")).with_export_root(PathBuf::from("/exp"));
        assert_eq!(
            config.default_document(EntityKind::Customers),
            PathBuf::from("/exp/clientes/clientes.xml")
        );
        assert_eq!(
            config.default_document(EntityKind::Tickets),
            PathBuf::from("/exp/chamados/chamados.xml")
        );
    }
}
