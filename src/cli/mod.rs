//! CLI definitions using clap.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::sync::{Operation, Request};

pub mod commands;
pub mod report;

/// HelpHub import/export - move customers and tickets between the
/// record store and XML documents
///
/// Without an operation flag an interactive menu is started.
#[derive(Parser, Debug)]
#[command(name = "hhsync", author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("operation")
        .args(["export_clients", "import_clients", "export_calls", "import_calls"])
))]
pub struct Cli {
    /// Record store path (default: ../Programa de Chamados/backend/database.db next to the binary)
    #[arg(long, env = "HHSYNC_DB")]
    pub db: Option<PathBuf>,

    /// Export customers to an XML file
    #[arg(long, value_name = "PATH")]
    pub export_clients: Option<String>,

    /// Import customers from an XML file
    #[arg(long, value_name = "PATH")]
    pub import_clients: Option<String>,

    /// Export tickets (with their update entries) to an XML file
    #[arg(long, value_name = "PATH")]
    pub export_calls: Option<String>,

    /// Import tickets (with their update entries) from an XML file
    #[arg(long, value_name = "PATH")]
    pub import_calls: Option<String>,

    /// Only export tickets with this status (e.g. Aberto, Finalizado)
    #[arg(long, value_name = "STATUS", requires = "export_calls")]
    pub calls_status: Option<String>,

    /// Output the operation report as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// The operation requested by flags, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `--calls-status` is given
    /// without `--export-calls`.
    pub fn request(&self) -> Result<Option<Request>> {
        if self.calls_status.is_some() && self.export_calls.is_none() {
            return Err(Error::InvalidArgument(
                "--calls-status only applies to --export-calls".to_string(),
            ));
        }

        let flags = [
            (Operation::ExportCustomers, &self.export_clients),
            (Operation::ImportCustomers, &self.import_clients),
            (Operation::ExportTickets, &self.export_calls),
            (Operation::ImportTickets, &self.import_calls),
        ];

        Ok(flags.into_iter().find_map(|(operation, path)| {
            path.as_ref().map(|path| {
                let request = Request::new(operation, path.clone());
                if operation == Operation::ExportTickets {
                    request.with_status(self.calls_status.clone())
                } else {
                    request
                }
            })
        }))
    }
}
