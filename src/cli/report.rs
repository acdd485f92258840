//! Human-readable operation reports.

use std::io::{self, Write};

use colored::Colorize;

use crate::sync::OperationReport;

const BOX_WIDTH: usize = 61;

/// Boxed screen title, e.g. the menu headers.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_banner<W: Write + ?Sized>(out: &mut W, title: &str) -> io::Result<()> {
    let rule = "─".repeat(BOX_WIDTH);
    let pad = BOX_WIDTH.saturating_sub(title.chars().count());
    let left = pad / 2;
    writeln!(out, "\n┌{rule}┐")?;
    writeln!(
        out,
        "│{}{}{}│",
        " ".repeat(left),
        title.bold(),
        " ".repeat(pad - left)
    )?;
    writeln!(out, "└{rule}┘")
}

/// The error report: operation, time, details, and every accumulated error
/// with its type, message, affected data and suggestion.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_error_report<W: Write + ?Sized>(out: &mut W, report: &OperationReport) -> io::Result<()> {
    write_banner(out, "ERROR REPORT")?;
    writeln!(out, "\nOperation: {}", report.operation.title())?;
    writeln!(
        out,
        "Date/Time: {}",
        report.finished_at.format("%d/%m/%Y %H:%M:%S")
    )?;

    writeln!(out, "\nOperation details:")?;
    writeln!(out, "  file: {}", report.path.display())?;
    if let Some(store) = &report.store {
        writeln!(out, "  store: {}", store.display())?;
    }
    if let Some(status) = &report.status_filter {
        writeln!(out, "  status: {status}")?;
    }

    writeln!(out, "\n{}", "Errors found:".red().bold())?;
    for (i, error) in report.errors.iter().enumerate() {
        writeln!(out, "\n{}. Error type: {}", i + 1, error.kind.label().red())?;
        writeln!(out, "   Description: {}", error.message)?;
        if let Some(data) = &error.data {
            writeln!(out, "   Affected data: {data}")?;
        }
        if let Some(suggestion) = &error.suggestion {
            writeln!(out, "   Suggestion: {}", suggestion.yellow())?;
        }
    }
    Ok(())
}

/// One-paragraph outcome with the relevant counters.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_summary<W: Write + ?Sized>(out: &mut W, report: &OperationReport) -> io::Result<()> {
    let stats = &report.stats;
    let status = if report.success {
        "completed".green().bold()
    } else {
        "failed".red().bold()
    };
    writeln!(out, "\n{} {status}", report.operation.title())?;

    if report.operation.is_export() {
        if report.success {
            writeln!(out, "  Records exported: {}", stats.exported)?;
            if stats.entries_exported > 0 {
                writeln!(out, "  Update entries:   {}", stats.entries_exported)?;
            }
            writeln!(out, "  File: {}", report.path.display())?;
        }
    } else if stats.processed > 0 {
        writeln!(out, "  Processed: {}", stats.processed)?;
        writeln!(out, "  Imported:  {}", stats.imported)?;
        if stats.skipped > 0 {
            writeln!(out, "  Skipped:   {}", stats.skipped)?;
        }
        if stats.entries_imported > 0 || stats.entries_skipped > 0 {
            writeln!(out, "  Update entries imported: {}", stats.entries_imported)?;
        }
        if stats.entries_skipped > 0 {
            writeln!(out, "  Update entries skipped:  {}", stats.entries_skipped)?;
        }
    }

    if report.aborted && stats.imported > 0 {
        writeln!(
            out,
            "  {}",
            "Stopped early; records imported before the failure were kept.".yellow()
        )?;
    }
    Ok(())
}

/// Inline report for flag mode: errors (if any) then the summary.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_report<W: Write + ?Sized>(out: &mut W, report: &OperationReport) -> io::Result<()> {
    if !report.errors.is_empty() {
        write_error_report(out, report)?;
    }
    write_summary(out, report)
}
