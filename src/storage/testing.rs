//! Reference schema and fixtures for tests.
//!
//! Mirrors the ticketing backend's tables closely enough to exercise the
//! dynamic column mapping.

use rusqlite::Connection;
use std::path::{Path, PathBuf};

use super::SqliteStorage;

pub const REFERENCE_SCHEMA: &str = r"
CREATE TABLE clientes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    email TEXT,
    telefone TEXT,
    empresa TEXT
);

CREATE TABLE chamados (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cliente_id INTEGER,
    descricao TEXT NOT NULL,
    status TEXT,
    data_abertura TEXT
);

CREATE TABLE chamado_andamentos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chamado_id INTEGER NOT NULL REFERENCES chamados(id),
    data_hora TEXT NOT NULL,
    texto TEXT NOT NULL
);
";

/// In-memory store with the reference schema.
pub fn memory_store() -> SqliteStorage {
    let storage = SqliteStorage::open_memory().unwrap();
    storage.conn().execute_batch(REFERENCE_SCHEMA).unwrap();
    storage
}

/// Create `database.db` with the reference schema under `dir`.
pub fn file_store(dir: &Path) -> PathBuf {
    let path = dir.join("database.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(REFERENCE_SCHEMA).unwrap();
    path
}
