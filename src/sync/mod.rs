//! XML sync operations.
//!
//! This module moves customer and ticket records between the record store
//! and XML interchange documents:
//!
//! - **Export**: live table rows → one element per row, one child per column
//! - **Import**: record elements → rows, mapped onto the live column set
//! - **Operations**: the validate → open → map → report pipeline
//!
//! # Document format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <chamados>
//!   <chamado>
//!     <id>7</id>
//!     <descricao>Printer jam</descricao>
//!     <status>Aberto</status>
//!     <andamentos>
//!       <andamento>
//!         <id>12</id>
//!         <data_hora>2024-03-01 12:00:00</data_hora>
//!         <texto>Opened</texto>
//!       </andamento>
//!     </andamentos>
//!   </chamado>
//! </chamados>
//! ```
//!
//! Imports also accept the English aliases (`clients`/`client`,
//! `calls`/`call`, `updates`/`update`).
//!
//! # Example
//!
//! ```ignore
//! use hhsync::sync::{execute, Operation, Request};
//!
//! let request = Request::new(Operation::ExportTickets, "/tmp/chamados.xml")
//!     .with_status(Some("Aberto".into()));
//! let report = execute(&config, &request);
//! println!("{} tickets exported", report.stats.exported);
//! ```

mod document;
mod export;
mod file;
mod import;
mod operations;
mod types;

pub use document::{Element, parse, to_xml};
pub use export::Exporter;
pub use file::{atomic_write, read_document, write_document};
pub use import::Importer;
pub use operations::execute;
pub use types::{
    EntityKind, ErrorKind, ErrorRecord, Operation, OperationReport, OperationStats, Request,
    SyncError, SyncResult,
};
