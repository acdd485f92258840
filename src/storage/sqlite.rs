//! SQLite storage implementation.
//!
//! The record store schema is owned by the ticketing backend, so nothing
//! here creates tables. Columns are discovered at runtime and every query is
//! built from the live column list.

use crate::error::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Transaction, params, params_from_iter};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Table holding ticket update entries.
pub const UPDATE_ENTRIES_TABLE: &str = "chamado_andamentos";

/// A row, values in the order of the projected columns.
pub type Row = Vec<Value>;

/// SQLite-based record store.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// A timestamped status note attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateEntry {
    pub id: i64,
    pub timestamp: Option<String>,
    pub text: Option<String>,
}

impl SqliteStorage {
    /// Open an existing store.
    ///
    /// Unlike the backend, this never creates the file: a missing store is
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened as a database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::configure(conn)
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a single transaction and commit once at the end.
    ///
    /// A statement that fails inside `f` only undoes itself; rows inserted
    /// before it stay in the batch. If `f` returns an error the whole batch
    /// is rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot begin, `f` fails, or the
    /// commit fails.
    pub fn batch<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Deferred)?;

        let result = f(&tx)?;

        tx.commit()?;
        tracing::debug!(op, "batch committed");
        Ok(result)
    }

    // ==================
    // Schema Introspection
    // ==================

    /// Live column names of `table`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableNotFound`] if the table has no columns (does not
    /// exist), or a database error if the query fails.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(Error::TableNotFound {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }

    // ==================
    // Reads
    // ==================

    /// Count the rows of `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_rows(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Select `columns` from `table`, optionally filtered by one
    /// `column = value` equality.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn select_rows(
        &self,
        table: &str,
        columns: &[String],
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<Row>> {
        let projection = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {projection} FROM {}", quote_ident(table));
        if let Some((column, _)) = filter {
            sql.push_str(&format!(" WHERE {} = ?1", quote_ident(column)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let width = columns.len();
        let map_row = |row: &rusqlite::Row<'_>| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Row>>()
        };

        let rows = match filter {
            Some((_, value)) => stmt.query_map([value], map_row)?,
            None => stmt.query_map([], map_row)?,
        };
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Update entries of one ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn update_entries(&self, ticket_id: &Value) -> Result<Vec<UpdateEntry>> {
        let sql = format!(
            "SELECT id, data_hora, texto FROM {} WHERE chamado_id = ?1 ORDER BY data_hora ASC, id ASC",
            quote_ident(UPDATE_ENTRIES_TABLE)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map([ticket_id], |row| {
                Ok(UpdateEntry {
                    id: row.get(0)?,
                    timestamp: value_to_text(&row.get::<_, Value>(1)?),
                    text: value_to_text(&row.get::<_, Value>(2)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

// ==================
// Writes (inside a batch)
// ==================

/// Insert one record and return the store-generated row id.
///
/// `fields` must not contain the identifier column.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_record(
    conn: &Connection,
    table: &str,
    fields: &[(String, Option<String>)],
) -> Result<i64> {
    let sql = if fields.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table))
    } else {
        let columns = fields
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=fields.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders})",
            quote_ident(table)
        )
    };

    conn.execute(&sql, params_from_iter(fields.iter().map(|(_, v)| v)))?;
    Ok(conn.last_insert_rowid())
}

/// Insert one update entry linked to `ticket_id`.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. the ticket does not exist).
pub fn insert_update_entry(
    conn: &Connection,
    ticket_id: i64,
    timestamp: &str,
    text: &str,
) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {} (chamado_id, data_hora, texto) VALUES (?1, ?2, ?3)",
        quote_ident(UPDATE_ENTRIES_TABLE)
    );
    conn.execute(&sql, params![ticket_id, timestamp, text])?;
    Ok(conn.last_insert_rowid())
}

// ==================
// Helpers
// ==================

/// Quote an SQL identifier.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// String form of a stored value; `None` for NULL.
#[must_use]
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) if r.is_finite() && r.fract() == 0.0 => Some(format!("{r:.1}")),
        Value::Real(r) => Some(r.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Whether an error means the store itself is unusable, as opposed to one
/// record being rejected.
#[must_use]
pub fn is_connectivity_error(err: &Error) -> bool {
    use rusqlite::ErrorCode;

    let Error::Database(db_err) = err else {
        return false;
    };
    matches!(
        db_err.sqlite_error_code(),
        Some(
            ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::ReadOnly
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::DiskFull
                | ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::memory_store;

    #[test]
    fn test_open_memory() {
        let storage = SqliteStorage::open_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.db");
        assert!(SqliteStorage::open(&missing).is_err());
        assert!(!missing.exists());
    }

    #[test]
    fn test_table_columns_in_declaration_order() {
        let storage = memory_store();
        let columns = storage.table_columns("clientes").unwrap();
        assert_eq!(columns, vec!["id", "nome", "email", "telefone", "empresa"]);
    }

    #[test]
    fn test_table_columns_unknown_table() {
        let storage = memory_store();
        let err = storage.table_columns("nope").unwrap_err();
        assert!(matches!(err, Error::TableNotFound { .. }));
    }

    #[test]
    fn test_insert_and_select_with_filter() {
        let mut storage = memory_store();
        let ids = storage
            .batch("test", |tx| {
                let a = insert_record(
                    tx,
                    "chamados",
                    &[
                        ("descricao".into(), Some("Printer jam".into())),
                        ("status".into(), Some("Aberto".into())),
                    ],
                )?;
                let b = insert_record(
                    tx,
                    "chamados",
                    &[
                        ("descricao".into(), Some("VPN down".into())),
                        ("status".into(), Some("Finalizado".into())),
                    ],
                )?;
                Ok((a, b))
            })
            .unwrap();
        assert_ne!(ids.0, ids.1);

        let columns = vec!["id".to_string(), "descricao".to_string()];
        let open = storage
            .select_rows("chamados", &columns, Some(("status", "Aberto")))
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0][1], Value::Text("Printer jam".into()));

        assert_eq!(storage.count_rows("chamados").unwrap(), 2);
    }

    #[test]
    fn test_update_entries_ordered_by_timestamp() {
        let mut storage = memory_store();
        let ticket = storage
            .batch("test", |tx| {
                let ticket =
                    insert_record(tx, "chamados", &[("descricao".into(), Some("x".into()))])?;
                insert_update_entry(tx, ticket, "2024-01-01 10:02:00", "third")?;
                insert_update_entry(tx, ticket, "2024-01-01 10:00:00", "first")?;
                insert_update_entry(tx, ticket, "2024-01-01 10:01:00", "second")?;
                Ok(ticket)
            })
            .unwrap();

        let entries = storage.update_entries(&Value::Integer(ticket)).unwrap();
        let texts: Vec<_> = entries.iter().map(|e| e.text.clone().unwrap()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_update_entry_requires_existing_ticket() {
        let mut storage = memory_store();
        let result = storage.batch("test", |tx| insert_update_entry(tx, 999, "t", "x"));
        assert!(result.is_err());
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&Value::Null), None);
        assert_eq!(value_to_text(&Value::Integer(7)), Some("7".into()));
        assert_eq!(value_to_text(&Value::Real(2.0)), Some("2.0".into()));
        assert_eq!(value_to_text(&Value::Real(2.5)), Some("2.5".into()));
        assert_eq!(value_to_text(&Value::Text("a".into())), Some("a".into()));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("nome"), "\"nome\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_constraint_error_is_not_connectivity() {
        let mut storage = memory_store();
        let err = storage
            .batch("test", |tx| insert_record(tx, "clientes", &[("nome".into(), None)]))
            .unwrap_err();
        assert!(!is_connectivity_error(&err));
    }
}
