//! XML import functionality.
//!
//! Each record element is mapped onto the live column set of its table:
//! same-named child elements supply values, missing or blank children become
//! NULL, extra children are ignored. The store always generates identifiers;
//! update entries are linked to the freshly generated ticket id.
//!
//! All inserts of one document share a single transaction that is committed
//! once at the end. A rejected record does not undo the ones before it.

use std::path::Path;

use rusqlite::Connection;

use crate::error::Error;
use crate::storage::{SqliteStorage, insert_record, insert_update_entry, is_connectivity_error};
use crate::sync::document::Element;
use crate::sync::file::read_document;
use crate::sync::types::{
    ENTRY_TEXT_ALIASES, ENTRY_TIMESTAMP_ALIASES, EntityKind, ErrorKind, ErrorRecord, ID_COLUMN,
    OperationReport, SyncError, SyncResult, UPDATES_CONTAINER_ALIASES, UPDATE_ENTRY_ALIASES,
};

/// Longest excerpt of a record shown in error reports.
const EXCERPT_CHARS: usize = 50;

/// Importer for customer and ticket documents.
pub struct Importer<'a> {
    storage: &'a mut SqliteStorage,
}

impl<'a> Importer<'a> {
    #[must_use]
    pub fn new(storage: &'a mut SqliteStorage) -> Self {
        Self { storage }
    }

    /// Import customers from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error for structural problems (unparseable document,
    /// unsupported root, no records) or if the batch cannot be committed.
    /// Per-record problems are accumulated in `report`.
    pub fn import_customers(&mut self, path: &Path, report: &mut OperationReport) -> SyncResult<()> {
        self.import(EntityKind::Customers, path, report)
    }

    /// Import tickets and their nested update entries from `path`.
    ///
    /// # Errors
    ///
    /// Same as [`Importer::import_customers`].
    pub fn import_tickets(&mut self, path: &Path, report: &mut OperationReport) -> SyncResult<()> {
        self.import(EntityKind::Tickets, path, report)
    }

    fn import(&mut self, kind: EntityKind, path: &Path, report: &mut OperationReport) -> SyncResult<()> {
        let root = read_document(path)?;
        let records = record_elements(kind, &root)?;
        tracing::debug!(count = records.len(), root = %root.name, "found record elements");

        let table = kind.table();
        let columns = self.storage.table_columns(table)?;
        let required = required_column(kind, &columns)?;

        let committed = self.storage.batch(kind.table(), |tx| {
            for element in records {
                report.stats.processed += 1;

                let fields: Vec<(String, Option<String>)> = columns
                    .iter()
                    .map(|column| (column.clone(), element.field(column).map(str::to_string)))
                    .collect();

                let Some(required_value) = fields
                    .iter()
                    .find(|(column, _)| column == required)
                    .and_then(|(_, value)| value.clone())
                else {
                    tracing::warn!(kind = kind.label(), "record without {required} skipped");
                    report.skip(
                        ErrorRecord::new(
                            ErrorKind::MissingRequiredField,
                            format!("{} without {required} found in document", capitalize(kind.label())),
                        )
                        .with_suggestion(format!("Every {} must have a {required}", kind.label())),
                    );
                    continue;
                };

                let insert: Vec<_> = fields
                    .into_iter()
                    .filter(|(column, _)| column != ID_COLUMN)
                    .collect();

                tracing::debug!(kind = kind.label(), "importing {}", excerpt(&required_value, 30));
                let new_id = match insert_record(tx, table, &insert) {
                    Ok(id) => id,
                    Err(e) if is_connectivity_error(&e) => {
                        abort_batch(report, &e);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(kind = kind.label(), error = %e, "insert failed");
                        report.skip(
                            ErrorRecord::new(
                                ErrorKind::StoreInsert,
                                format!("Failed to import {}: {e}", kind.label()),
                            )
                            .with_data(format!("{required}: {}", excerpt(&required_value, EXCERPT_CHARS)))
                            .with_suggestion(format!("Check that the {} data is valid", kind.label())),
                        );
                        continue;
                    }
                };

                if kind == EntityKind::Tickets {
                    if let Err(e) = import_entries(tx, element, new_id, report) {
                        abort_batch(report, &e);
                        report.stats.imported += 1;
                        break;
                    }
                }

                report.stats.imported += 1;
            }
            Ok(())
        });

        if let Err(e) = committed {
            // The whole batch was rolled back
            report.stats.imported = 0;
            report.stats.entries_imported = 0;
            return Err(e.into());
        }

        tracing::info!(
            kind = kind.label(),
            imported = report.stats.imported,
            skipped = report.stats.skipped,
            entries = report.stats.entries_imported,
            "import finished"
        );
        Ok(())
    }
}

/// Check the root tag and collect record elements.
fn record_elements(kind: EntityKind, root: &Element) -> SyncResult<Vec<&Element>> {
    if !kind.root_aliases().contains(&root.name.as_str()) {
        return Err(SyncError::UnsupportedRootTag {
            found: root.name.clone(),
            expected: tag_list(kind.root_aliases()),
        });
    }

    // Generic alias first, then the localized one
    let mut aliases = kind.record_aliases().to_vec();
    aliases.reverse();
    let records = root.children_any(&aliases);
    if records.is_empty() {
        return Err(SyncError::NoRecordsFound {
            expected: tag_list(kind.record_aliases()),
        });
    }
    Ok(records)
}

/// The column holding the required field in the live schema.
fn required_column(kind: EntityKind, columns: &[String]) -> SyncResult<&'static str> {
    kind.required_aliases()
        .iter()
        .copied()
        .find(|alias| columns.iter().any(|c| c == alias))
        .ok_or_else(|| SyncError::MissingColumn {
            table: kind.table().to_string(),
            expected: kind.required_aliases().join(" or "),
        })
}

/// Insert the update entries nested under a ticket element.
///
/// Malformed or rejected entries are skipped one by one. Only a
/// connectivity failure is returned.
fn import_entries(
    conn: &Connection,
    ticket: &Element,
    ticket_id: i64,
    report: &mut OperationReport,
) -> Result<(), Error> {
    let Some(container) = ticket.child_any(UPDATES_CONTAINER_ALIASES) else {
        return Ok(());
    };

    for entry in container.children_any(UPDATE_ENTRY_ALIASES) {
        let timestamp = entry.field_any(ENTRY_TIMESTAMP_ALIASES);
        let text = entry.field_any(ENTRY_TEXT_ALIASES);

        let (Some(timestamp), Some(text)) = (timestamp, text) else {
            report.stats.entries_skipped += 1;
            report.push(
                ErrorRecord::new(
                    ErrorKind::MalformedEntry,
                    "Update entry without timestamp or text skipped",
                )
                .with_data(format!("ticket id: {ticket_id}"))
                .with_suggestion("Every update entry needs both data_hora and texto"),
            );
            continue;
        };

        match insert_update_entry(conn, ticket_id, timestamp, text) {
            Ok(_) => report.stats.entries_imported += 1,
            Err(e) if is_connectivity_error(&e) => return Err(e),
            Err(e) => {
                report.stats.entries_skipped += 1;
                report.push(
                    ErrorRecord::new(
                        ErrorKind::StoreInsert,
                        format!("Failed to import update entry: {e}"),
                    )
                    .with_data(excerpt(text, EXCERPT_CHARS))
                    .with_suggestion("Check the update entry data"),
                );
            }
        }
    }
    Ok(())
}

/// Stop the record loop; rows inserted so far are still committed.
fn abort_batch(report: &mut OperationReport, err: &Error) {
    tracing::error!(error = %err, "store unavailable, stopping import");
    report.push(
        ErrorRecord::new(ErrorKind::Database, err.to_string())
            .with_suggestion("Check the database connection and that no other program holds a lock"),
    );
}

fn tag_list(aliases: &[&str]) -> String {
    aliases
        .iter()
        .map(|a| format!("<{a}>"))
        .collect::<Vec<_>>()
        .join(" or ")
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
