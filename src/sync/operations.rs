//! The four import/export operations.
//!
//! Every operation runs the same pipeline: validate the document path, open
//! the store, run the mapper in the requested direction, and fold whatever
//! went wrong into the returned [`OperationReport`]. Nothing escapes as an
//! `Err`; one call is one unit of failure.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::storage::SqliteStorage;
use crate::sync::export::Exporter;
use crate::sync::import::Importer;
use crate::sync::types::{ErrorRecord, Operation, OperationReport, Request, SyncResult};
use crate::validate::{PathMode, validate_path};

/// Run one operation against the configured store.
#[must_use]
pub fn execute(config: &AppConfig, request: &Request) -> OperationReport {
    let operation = request.operation;
    let span = tracing::info_span!("operation", op = operation.as_str());
    let _guard = span.enter();

    let mut report = OperationReport::new(operation, PathBuf::from(request.path.trim()));
    report.store = Some(config.db_path.clone());
    report.status_filter = status_filter(request);

    if let Err(e) = run(&config.db_path, request, &mut report) {
        tracing::warn!(error = %e, "operation failed");
        report.push(ErrorRecord::from(&e));
    }

    report.finish();
    tracing::info!(success = report.success, errors = report.errors.len(), "operation done");
    report
}

fn run(db_path: &Path, request: &Request, report: &mut OperationReport) -> SyncResult<()> {
    let operation = request.operation;
    let mode = if operation.is_export() {
        PathMode::Write
    } else {
        PathMode::Read
    };

    let path = validate_path(&request.path, mode)?;
    report.path.clone_from(&path);

    // Connection lives for this call only
    let mut storage = SqliteStorage::open(db_path)?;
    tracing::debug!(store = %db_path.display(), document = %path.display(), "store opened");

    match operation {
        Operation::ExportCustomers => Exporter::new(&storage).export_customers(&path, report),
        Operation::ExportTickets => {
            let status = report.status_filter.clone();
            Exporter::new(&storage).export_tickets(&path, status.as_deref(), report)
        }
        Operation::ImportCustomers => Importer::new(&mut storage).import_customers(&path, report),
        Operation::ImportTickets => Importer::new(&mut storage).import_tickets(&path, report),
    }
}

/// Blank filters mean "all"; filters only apply to ticket export.
fn status_filter(request: &Request) -> Option<String> {
    if request.operation != Operation::ExportTickets {
        return None;
    }
    request
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
