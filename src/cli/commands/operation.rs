//! Flag-mode operations (`--export-clients` and friends).

use std::io::{self, Write};

use crate::cli::report::write_report;
use crate::config::AppConfig;
use crate::error::Result;
use crate::sync::{OperationReport, Request, execute as run_operation};

/// Run one operation and print its report.
///
/// A failed report is still a completed command; only output failures are
/// returned as errors.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized or printed.
pub fn execute(config: &AppConfig, request: &Request, json: bool, quiet: bool) -> Result<()> {
    let report = run_operation(config, request);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_report(&mut out, &report, json, quiet)
}

fn print_report<W: Write>(out: &mut W, report: &OperationReport, json: bool, quiet: bool) -> Result<()> {
    if json {
        let payload = serde_json::to_string(report)?;
        writeln!(out, "{payload}")?;
    } else if !quiet || !report.success {
        write_report(out, report)?;
    }
    Ok(())
}
