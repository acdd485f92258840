//! Sync types for XML export/import.
//!
//! Entity descriptions (table names and accepted tag aliases), the
//! per-operation report, and the error taxonomy of the document mapper.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::validate::PathError;

/// Identifier column, never inserted on import.
pub const ID_COLUMN: &str = "id";

/// Ticket column used by the export status filter.
pub const STATUS_COLUMN: &str = "status";

/// Container of a ticket's update entries.
pub const UPDATES_CONTAINER_ALIASES: &[&str] = &["andamentos", "updates"];
/// One update entry.
pub const UPDATE_ENTRY_ALIASES: &[&str] = &["andamento", "update"];
pub const ENTRY_TIMESTAMP_ALIASES: &[&str] = &["data_hora", "timestamp"];
pub const ENTRY_TEXT_ALIASES: &[&str] = &["texto", "text"];

/// Child element names written for each exported update entry.
pub const ENTRY_EXPORT_FIELDS: [&str; 3] = ["id", "data_hora", "texto"];

/// The two entity collections that can be synchronized.
///
/// The first alias of every list is the localized name used on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customers,
    Tickets,
}

impl EntityKind {
    /// Store table holding this entity.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Customers => "clientes",
            Self::Tickets => "chamados",
        }
    }

    #[must_use]
    pub const fn root_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Customers => &["clientes", "clients"],
            Self::Tickets => &["chamados", "calls"],
        }
    }

    #[must_use]
    pub const fn record_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Customers => &["cliente", "client"],
            Self::Tickets => &["chamado", "call"],
        }
    }

    /// Column names that may hold the required field, in preference order.
    #[must_use]
    pub const fn required_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Customers => &["nome", "name"],
            Self::Tickets => &["descricao", "description"],
        }
    }

    #[must_use]
    pub const fn root_tag(self) -> &'static str {
        self.root_aliases()[0]
    }

    #[must_use]
    pub const fn record_tag(self) -> &'static str {
        self.record_aliases()[0]
    }

    /// Singular human label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Customers => "customer",
            Self::Tickets => "ticket",
        }
    }
}

/// The four operations the tool performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ExportCustomers,
    ImportCustomers,
    ExportTickets,
    ImportTickets,
}

impl Operation {
    #[must_use]
    pub const fn entity(self) -> EntityKind {
        match self {
            Self::ExportCustomers | Self::ImportCustomers => EntityKind::Customers,
            Self::ExportTickets | Self::ImportTickets => EntityKind::Tickets,
        }
    }

    #[must_use]
    pub const fn is_export(self) -> bool {
        matches!(self, Self::ExportCustomers | Self::ExportTickets)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExportCustomers => "export_customers",
            Self::ImportCustomers => "import_customers",
            Self::ExportTickets => "export_tickets",
            Self::ImportTickets => "import_tickets",
        }
    }

    /// Title shown on reports.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ExportCustomers => "Customer export",
            Self::ImportCustomers => "Customer import",
            Self::ExportTickets => "Ticket export",
            Self::ImportTickets => "Ticket import",
        }
    }
}

/// What to run: an operation, the raw document path, and for ticket
/// export an optional status filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    pub status: Option<String>,
}

impl Request {
    #[must_use]
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            operation,
            path: path.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }
}

// ── Report ────────────────────────────────────────────────────

/// Category of an accumulated error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Permission,
    StructuralParse,
    UnsupportedRootTag,
    NoRecordsFound,
    EmptyTable,
    MissingColumn,
    MissingRequiredField,
    StoreInsert,
    MalformedEntry,
    Database,
    Write,
    Unexpected,
}

impl ErrorKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Permission => "Permission error",
            Self::StructuralParse => "Malformed document",
            Self::UnsupportedRootTag => "Unsupported format",
            Self::NoRecordsFound => "No records found",
            Self::EmptyTable => "Nothing to export",
            Self::MissingColumn => "Schema mismatch",
            Self::MissingRequiredField => "Invalid record",
            Self::StoreInsert => "Insert failed",
            Self::MalformedEntry => "Invalid update entry",
            Self::Database => "Database error",
            Self::Write => "Write error",
            Self::Unexpected => "Unexpected error",
        }
    }

    /// Whether this error stops the whole operation.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(
            self,
            Self::MissingRequiredField | Self::StoreInsert | Self::MalformedEntry
        )
    }
}

/// One accumulated error with optional affected data and remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorRecord {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<&SyncError> for ErrorRecord {
    fn from(err: &SyncError) -> Self {
        let record = Self::new(err.kind(), err.to_string());
        let record = match err {
            SyncError::Io(e) => record.with_data(format!("{e:?}")),
            _ => record,
        };
        match err.suggestion() {
            Some(s) => record.with_suggestion(s),
            None => record,
        }
    }
}

/// Counters for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    /// Records read from the store.
    pub exported: usize,
    /// Update entries written during ticket export.
    pub entries_exported: usize,
    /// Record elements examined during import.
    pub processed: usize,
    pub imported: usize,
    pub skipped: usize,
    pub entries_imported: usize,
    pub entries_skipped: usize,
}

/// Outcome of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    pub operation: Operation,
    pub path: PathBuf,
    /// Record store the operation ran against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<String>,
    pub success: bool,
    /// Set when a fatal error stopped the operation.
    pub aborted: bool,
    pub stats: OperationStats,
    pub errors: Vec<ErrorRecord>,
    pub finished_at: DateTime<Local>,
}

impl OperationReport {
    #[must_use]
    pub fn new(operation: Operation, path: PathBuf) -> Self {
        Self {
            operation,
            path,
            store: None,
            status_filter: None,
            success: false,
            aborted: false,
            stats: OperationStats::default(),
            errors: Vec::new(),
            finished_at: Local::now(),
        }
    }

    /// Record an error; fatal kinds also mark the operation aborted.
    pub fn push(&mut self, record: ErrorRecord) {
        if record.kind.is_fatal() {
            self.aborted = true;
        }
        self.errors.push(record);
    }

    /// Record a skipped record.
    pub fn skip(&mut self, record: ErrorRecord) {
        self.stats.skipped += 1;
        self.push(record);
    }

    /// Compute the success flag.
    ///
    /// Exports succeed unless aborted; imports additionally need at least
    /// one imported record.
    pub fn finish(&mut self) {
        self.success = !self.aborted && (self.operation.is_export() || self.stats.imported > 0);
        self.finished_at = Local::now();
    }
}

// ── Errors ────────────────────────────────────────────────────

/// Errors that abort a sync operation.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The document path failed pre-flight validation.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The document is not well-formed XML.
    #[error("Could not parse document: {0}")]
    StructuralParse(String),

    /// The root element is not one of the accepted aliases.
    #[error("Root tag <{found}> is not supported (expected {expected})")]
    UnsupportedRootTag { found: String, expected: String },

    /// The root has no child matching any record alias.
    #[error("No {expected} elements found in document")]
    NoRecordsFound { expected: String },

    /// The table is empty.
    #[error("No records found in table '{0}'")]
    EmptyTable(String),

    /// A column the operation depends on is absent from the live schema.
    #[error("Table '{table}' has no {expected} column")]
    MissingColumn { table: String, expected: String },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document serialization error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl SyncError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Path(_) => ErrorKind::Permission,
            Self::StructuralParse(_) => ErrorKind::StructuralParse,
            Self::UnsupportedRootTag { .. } => ErrorKind::UnsupportedRootTag,
            Self::NoRecordsFound { .. } => ErrorKind::NoRecordsFound,
            Self::EmptyTable(_) => ErrorKind::EmptyTable,
            Self::MissingColumn { .. } => ErrorKind::MissingColumn,
            Self::Database(_) => ErrorKind::Database,
            Self::Xml(_) => ErrorKind::Write,
            Self::Io(_) => ErrorKind::Unexpected,
        }
    }

    /// Remediation for the error report.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Path(e) => Some(e.suggestion()),
            Self::StructuralParse(_) => Some("Check that the file is well-formed XML and not truncated"),
            Self::UnsupportedRootTag { .. } | Self::NoRecordsFound { .. } => {
                Some("Use a document produced by this tool's export, or match its tag names")
            }
            Self::EmptyTable(_) => Some("Check that there are records in the store"),
            Self::MissingColumn { .. } => Some("Check that --db points at the ticketing database"),
            Self::Database(_) => Some("Check the database connection and that no other program holds a lock"),
            Self::Xml(_) => Some("Check permissions and free disk space"),
            Self::Io(_) => None,
        }
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<quick_xml::Error> for SyncError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<crate::error::Error> for SyncError {
    fn from(err: crate::error::Error) -> Self {
        use crate::error::Error;
        match err {
            Error::Sync(e) => e,
            Error::Path(e) => Self::Path(e),
            Error::Io(e) => Self::Io(e),
            other => Self::Database(other.to_string()),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_tags() {
        assert_eq!(EntityKind::Customers.root_tag(), "clientes");
        assert_eq!(EntityKind::Customers.record_tag(), "cliente");
        assert_eq!(EntityKind::Tickets.root_tag(), "chamados");
        assert_eq!(EntityKind::Tickets.record_aliases(), &["chamado", "call"]);
    }

    #[test]
    fn test_import_success_needs_one_record() {
        let mut report = OperationReport::new(Operation::ImportCustomers, PathBuf::from("a.xml"));
        report.skip(ErrorRecord::new(ErrorKind::MissingRequiredField, "no name"));
        report.finish();
        assert!(!report.success);
        assert!(!report.aborted);

        report.stats.imported = 1;
        report.finish();
        assert!(report.success);
    }

    #[test]
    fn test_fatal_error_aborts() {
        let mut report = OperationReport::new(Operation::ExportTickets, PathBuf::from("a.xml"));
        report.finish();
        assert!(report.success);

        report.push(ErrorRecord::from(&SyncError::EmptyTable("chamados".into())));
        report.finish();
        assert!(report.aborted);
        assert!(!report.success);
    }

    #[test]
    fn test_error_record_from_sync_error() {
        let err = SyncError::UnsupportedRootTag {
            found: "pedidos".into(),
            expected: "<clientes> or <clients>".into(),
        };
        let record = ErrorRecord::from(&err);
        assert_eq!(record.kind, ErrorKind::UnsupportedRootTag);
        assert!(record.message.contains("pedidos"));
        assert!(record.suggestion.is_some());
    }

    #[test]
    fn test_crate_error_unwraps_sync_error() {
        let err = crate::error::Error::Sync(SyncError::EmptyTable("clientes".into()));
        assert!(matches!(SyncError::from(err), SyncError::EmptyTable(_)));
    }
}
