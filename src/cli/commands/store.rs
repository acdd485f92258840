//! Record store resolution.

use std::io::Write;
use std::path::Path;

use crate::browser::{BrowseOptions, FsLister, KeySource, browse};
use crate::config::{AppConfig, db_candidates, resolve_db_path};
use crate::error::{Error, Result};

/// Suffix of selectable store files in the browser.
const DB_EXTENSION: &str = ".db";

/// Resolve the store and build the process configuration.
///
/// An explicit path is used as is; when it names no file, only the
/// interactive browser can stand in for it. Without a usable flag or
/// conventional location, the user may pick a `.db` file interactively when
/// `keys` is given.
///
/// # Errors
///
/// Returns [`Error::NoStore`] if nothing resolves, or
/// [`Error::Interrupted`] on Ctrl-C in the browser.
pub fn resolve_config<K, W>(
    explicit: Option<&Path>,
    interactive: Option<(&mut K, &mut W)>,
) -> Result<AppConfig>
where
    K: KeySource + ?Sized,
    W: Write,
{
    if let Some(path) = resolve_db_path(explicit) {
        tracing::debug!(store = %path.display(), "record store resolved");
        return Ok(AppConfig::new(path));
    }

    let searched = db_candidates(explicit);
    let Some((keys, out)) = interactive else {
        return Err(Error::NoStore { searched });
    };

    let expected = searched.first().map_or_else(String::new, |p| p.display().to_string());
    writeln!(out, "\nRecord store not found at: {expected}")?;
    writeln!(out, "\nPress any key to browse for the database file...")?;
    out.flush()?;
    keys.wait_any()?;

    let start = std::env::current_dir()?;
    let options = BrowseOptions::new("Select the database file", Some(DB_EXTENSION));
    match browse(&start, &FsLister, keys, out, &options)? {
        Some(path) => {
            writeln!(out, "\nRecord store set to: {}", path.display())?;
            Ok(AppConfig::new(path))
        }
        None => {
            writeln!(out, "\nNo database file selected.")?;
            Err(Error::NoStore { searched })
        }
    }
}
