//! XML export functionality.
//!
//! Rows are read with the live column list of their table, so the generated
//! element names always match the current schema. The whole document is
//! built in memory and written atomically at the end.

use std::path::Path;

use rusqlite::types::Value;

use crate::storage::{Row, SqliteStorage, value_to_text};
use crate::sync::document::Element;
use crate::sync::file::write_document;
use crate::sync::types::{
    ENTRY_EXPORT_FIELDS, EntityKind, ID_COLUMN, OperationReport, STATUS_COLUMN, SyncError,
    SyncResult, UPDATES_CONTAINER_ALIASES, UPDATE_ENTRY_ALIASES,
};

/// Exporter for customer and ticket documents.
pub struct Exporter<'a> {
    storage: &'a SqliteStorage,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(storage: &'a SqliteStorage) -> Self {
        Self { storage }
    }

    /// Export every customer to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or empty, a query fails, or
    /// the document cannot be written.
    pub fn export_customers(&self, path: &Path, report: &mut OperationReport) -> SyncResult<()> {
        let kind = EntityKind::Customers;
        let table = kind.table();

        if self.storage.count_rows(table)? == 0 {
            return Err(SyncError::EmptyTable(table.to_string()));
        }

        let columns = self.storage.table_columns(table)?;
        let rows = self.storage.select_rows(table, &columns, None)?;

        let mut root = Element::new(kind.root_tag());
        for row in &rows {
            root.push(record_element(kind, &columns, row));
        }

        write_document(path, &root)?;
        report.stats.exported = rows.len();
        tracing::info!(count = rows.len(), path = %path.display(), "exported customers");
        Ok(())
    }

    /// Export tickets to `path`, with their update entries nested.
    ///
    /// With `status`, only tickets whose status column equals it are
    /// exported. Zero matching tickets still produces a (root-only) document.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails, the status column is missing while
    /// filtering, or the document cannot be written.
    pub fn export_tickets(
        &self,
        path: &Path,
        status: Option<&str>,
        report: &mut OperationReport,
    ) -> SyncResult<()> {
        let kind = EntityKind::Tickets;
        let table = kind.table();
        let columns = self.storage.table_columns(table)?;

        if status.is_some() && !columns.iter().any(|c| c == STATUS_COLUMN) {
            return Err(SyncError::MissingColumn {
                table: table.to_string(),
                expected: STATUS_COLUMN.to_string(),
            });
        }

        let rows = self
            .storage
            .select_rows(table, &columns, status.map(|s| (STATUS_COLUMN, s)))?;

        // Rows are keyed by the id column; schemas without one use the first
        let id_index = columns.iter().position(|c| c == ID_COLUMN).unwrap_or(0);

        let mut root = Element::new(kind.root_tag());
        for row in &rows {
            let mut element = record_element(kind, &columns, row);
            let ticket_id = row.get(id_index).unwrap_or(&Value::Null);
            let entries = self.storage.update_entries(ticket_id)?;

            let mut container = Element::new(UPDATES_CONTAINER_ALIASES[0]);
            for entry in &entries {
                let mut entry_element = Element::new(UPDATE_ENTRY_ALIASES[0]);
                let id = entry.id.to_string();
                let values = [Some(id.as_str()), entry.timestamp.as_deref(), entry.text.as_deref()];
                for (name, value) in ENTRY_EXPORT_FIELDS.iter().zip(values) {
                    entry_element.push(Element::leaf(*name, value));
                }
                container.push(entry_element);
            }
            report.stats.entries_exported += entries.len();

            element.push(container);
            root.push(element);
        }

        write_document(path, &root)?;
        report.stats.exported = rows.len();
        tracing::info!(
            count = rows.len(),
            entries = report.stats.entries_exported,
            status = status.unwrap_or("*"),
            path = %path.display(),
            "exported tickets"
        );
        Ok(())
    }
}

/// One record element with a child per column; NULL becomes empty text.
fn record_element(kind: EntityKind, columns: &[String], row: &Row) -> Element {
    let mut element = Element::new(kind.record_tag());
    for (column, value) in columns.iter().zip(row) {
        element.push(Element::leaf(column.as_str(), value_to_text(value).as_deref()));
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::memory_store;
    use crate::storage::{insert_record, insert_update_entry};
    use crate::sync::file::read_document;
    use crate::sync::types::Operation;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn report(op: Operation) -> OperationReport {
        OperationReport::new(op, PathBuf::new())
    }

    #[test]
    fn test_export_customers_uses_live_columns() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = memory_store();
        storage
            .batch("seed", |tx| {
                insert_record(
                    tx,
                    "clientes",
                    &[
                        ("nome".into(), Some("Ana".into())),
                        ("email".into(), Some("ana@example.com".into())),
                    ],
                )?;
                Ok(())
            })
            .unwrap();

        let path = temp_dir.path().join("clientes.xml");
        let mut rep = report(Operation::ExportCustomers);
        Exporter::new(&storage).export_customers(&path, &mut rep).unwrap();
        assert_eq!(rep.stats.exported, 1);

        let root = read_document(&path).unwrap();
        assert_eq!(root.name, "clientes");
        let record = root.child("cliente").unwrap();
        let names: Vec<_> = record.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "nome", "email", "telefone", "empresa"]);
        assert_eq!(record.field("nome"), Some("Ana"));
        assert_eq!(record.field("telefone"), None);
    }

    #[test]
    fn test_export_customers_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        let storage = memory_store();
        let path = temp_dir.path().join("clientes.xml");

        let err = Exporter::new(&storage)
            .export_customers(&path, &mut report(Operation::ExportCustomers))
            .unwrap_err();
        assert!(matches!(err, SyncError::EmptyTable(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_tickets_orders_entries_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = memory_store();
        storage
            .batch("seed", |tx| {
                let open = insert_record(
                    tx,
                    "chamados",
                    &[
                        ("descricao".into(), Some("Printer jam".into())),
                        ("status".into(), Some("Aberto".into())),
                    ],
                )?;
                insert_record(
                    tx,
                    "chamados",
                    &[
                        ("descricao".into(), Some("Old issue".into())),
                        ("status".into(), Some("Finalizado".into())),
                    ],
                )?;
                insert_update_entry(tx, open, "2024-03-01 12:00:02", "T+2")?;
                insert_update_entry(tx, open, "2024-03-01 12:00:00", "T+0")?;
                insert_update_entry(tx, open, "2024-03-01 12:00:01", "T+1")?;
                Ok(())
            })
            .unwrap();

        let path = temp_dir.path().join("chamados.xml");
        let mut rep = report(Operation::ExportTickets);
        Exporter::new(&storage)
            .export_tickets(&path, Some("Aberto"), &mut rep)
            .unwrap();
        assert_eq!(rep.stats.exported, 1);
        assert_eq!(rep.stats.entries_exported, 3);

        let root = read_document(&path).unwrap();
        let tickets = root.children_any(&["chamado"]);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].field("descricao"), Some("Printer jam"));

        let entries = tickets[0].child("andamentos").unwrap().children_any(&["andamento"]);
        let texts: Vec<_> = entries.iter().map(|e| e.field("texto").unwrap()).collect();
        assert_eq!(texts, vec!["T+0", "T+1", "T+2"]);
        assert!(entries[0].field("id").is_some());
    }

    #[test]
    fn test_export_tickets_no_match_writes_empty_root() {
        let temp_dir = TempDir::new().unwrap();
        let storage = memory_store();
        let path = temp_dir.path().join("chamados.xml");

        let mut rep = report(Operation::ExportTickets);
        Exporter::new(&storage)
            .export_tickets(&path, Some("Finalizado"), &mut rep)
            .unwrap();
        assert_eq!(rep.stats.exported, 0);

        let root = read_document(&path).unwrap();
        assert_eq!(root.name, "chamados");
        assert!(root.children.is_empty());
    }
}
