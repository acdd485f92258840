//! Interactive browse loop.
//!
//! Redraws the current directory on every key, feeds the key to the
//! [`FileBrowser`], and stops at a selection or a cancel. Directories that
//! cannot be listed send the browser back to their parent after a short
//! pause.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use super::keys::KeySource;
use super::listing::{DirectoryLister, ListEntry};
use super::state::{FileBrowser, Transition};
use crate::error::Result;

/// Widest file name shown before truncation.
const NAME_WIDTH: usize = 40;

/// Presentation settings for one browse session.
#[derive(Debug, Clone)]
pub struct BrowseOptions<'a> {
    pub title: &'a str,
    /// Only files with this suffix can be selected.
    pub extension: Option<&'a str>,
    /// How long notices stay up before the screen is redrawn.
    pub error_pause: Duration,
    /// Clear the screen before each redraw.
    pub clear: bool,
}

impl<'a> BrowseOptions<'a> {
    #[must_use]
    pub fn new(title: &'a str, extension: Option<&'a str>) -> Self {
        Self {
            title,
            extension,
            error_pause: Duration::from_secs(1),
            clear: true,
        }
    }
}

/// Browse from `start` until a file is selected (`Some`) or the user
/// cancels (`None`).
///
/// # Errors
///
/// Returns [`crate::Error::Interrupted`] on Ctrl-C, or an IO error if the
/// screen cannot be written.
pub fn browse<L, K, W>(
    start: &Path,
    lister: &L,
    keys: &mut K,
    out: &mut W,
    options: &BrowseOptions<'_>,
) -> Result<Option<PathBuf>>
where
    L: DirectoryLister + ?Sized,
    K: KeySource + ?Sized,
    W: Write,
{
    let mut browser = FileBrowser::new(start, options.extension)?;

    loop {
        if options.clear {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        draw_header(out, options.title, browser.current_dir())?;

        let listing = match lister.list(browser.current_dir(), options.extension) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::debug!(dir = %browser.current_dir().display(), error = %e, "cannot list directory");
                writeln!(out, "\n{} {e}", "Cannot list this directory:".red())?;
                writeln!(out, "Returning to the parent directory...")?;
                out.flush()?;
                thread::sleep(options.error_pause);
                if browser.go_up() {
                    continue;
                }
                return Ok(None);
            }
        };

        if listing.is_empty() {
            writeln!(out, "\n{}", "Empty directory.".yellow())?;
            writeln!(out, "Press Backspace to go back...")?;
        } else {
            browser.clamp(listing.len());
            draw_rows(out, &browser, listing.entries())?;
        }
        out.flush()?;

        match browser.handle(keys.read_key()?, &listing) {
            Transition::Selected(path) => {
                tracing::debug!(path = %path.display(), "file selected");
                return Ok(Some(path));
            }
            Transition::Cancelled => {
                writeln!(out, "\nCancelled.")?;
                out.flush()?;
                return Ok(None);
            }
            Transition::Rejected(name) => {
                let ext = options.extension.unwrap_or_default().to_uppercase();
                writeln!(out, "\n{} ({name})", format!("Only {ext} files can be selected").red())?;
                out.flush()?;
                thread::sleep(options.error_pause);
            }
            Transition::Stay | Transition::Descended | Transition::Ascended => {}
        }
    }
}

fn draw_header<W: Write>(out: &mut W, title: &str, dir: &Path) -> std::io::Result<()> {
    let rule = "─".repeat(61);
    writeln!(out, "┌{rule}┐")?;
    writeln!(out, "│ {:<59} │", title.bold())?;
    writeln!(out, "└{rule}┘")?;
    writeln!(out, "\nCurrent folder: {}", dir.display().to_string().cyan())?;
    writeln!(out, "\nUse ↑ ↓ to move, ← → to change page, Enter to select,")?;
    writeln!(out, "Backspace to go up, Esc to cancel")
}

fn draw_rows<W: Write>(
    out: &mut W,
    browser: &FileBrowser,
    entries: &[ListEntry],
) -> std::io::Result<()> {
    writeln!(out, "\n  {:<width$}  TYPE", "NAME", width = NAME_WIDTH + 3)?;
    writeln!(out, "  {}", "─".repeat(NAME_WIDTH + 12))?;

    let extension = browser.extension().unwrap_or_default().to_uppercase();
    for index in browser.visible_range(entries.len()) {
        let entry = &entries[index];
        let (icon, kind) = if entry.is_dir {
            ("📁", "Folder".to_string())
        } else if entry.matches {
            ("📄", format!("{extension} file"))
        } else {
            ("📝", "File".to_string())
        };

        let name: String = entry.name.chars().take(NAME_WIDTH).collect();
        let row = format!("{icon} {name:<NAME_WIDTH$} {kind}");
        if index == browser.selected() {
            writeln!(out, "{} {}", "→".green().bold(), row.green())?;
        } else {
            writeln!(out, "  {row}")?;
        }
    }

    let (page, pages) = browser.page_info(entries.len());
    if pages > 1 {
        writeln!(out, "\nPage {page} of {pages} | {} items", entries.len())?;
    }
    Ok(())
}
