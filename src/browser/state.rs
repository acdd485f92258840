//! Browser state machine.
//!
//! [`FileBrowser`] holds the current directory, the selected index and the
//! first visible index. It never touches the filesystem: every transition
//! is computed from a [`Listing`] snapshot the caller took of the current
//! directory.

use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::keys::Key;
use super::listing::{Listing, has_extension};

/// Rows shown per page.
pub const PAGE_SIZE: usize = 15;

/// Result of feeding one key to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Still listing the same directory (selection may have moved).
    Stay,
    /// A file that does not match the extension filter was confirmed.
    Rejected(String),
    Descended,
    Ascended,
    /// A file was confirmed; the browser is done.
    Selected(PathBuf),
    /// The user backed out; the browser is done.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct FileBrowser {
    current: PathBuf,
    selected: usize,
    page_offset: usize,
    extension: Option<String>,
}

impl FileBrowser {
    /// Start browsing at `start`, made absolute against the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn new(start: &Path, extension: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            current: std::path::absolute(start)?,
            selected: 0,
            page_offset: 0,
            extension: extension.map(str::to_string),
        })
    }

    #[must_use]
    pub fn current_dir(&self) -> &Path {
        &self.current
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn page_offset(&self) -> usize {
        self.page_offset
    }

    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Whether a file name passes the extension filter (always, without one).
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        self.extension
            .as_deref()
            .is_none_or(|ext| has_extension(name, ext))
    }

    /// Move to the parent directory. Returns `false` at the filesystem root.
    pub fn go_up(&mut self) -> bool {
        let Some(parent) = self.current.parent().map(Path::to_path_buf) else {
            return false;
        };
        self.current = parent;
        self.reset();
        true
    }

    /// Apply one key against the snapshot of the current directory.
    pub fn handle(&mut self, key: Key, listing: &Listing) -> Transition {
        if listing.is_empty() {
            return match key {
                Key::Back => self.back(),
                _ => Transition::Stay,
            };
        }

        self.clamp(listing.len());
        let total = listing.len();

        match key {
            Key::Up => {
                self.selected = self.selected.saturating_sub(1);
                self.snap();
                Transition::Stay
            }
            Key::Down => {
                self.selected = (self.selected + 1).min(total - 1);
                self.snap();
                Transition::Stay
            }
            Key::PrevPage => {
                self.page_offset = self.page_offset.saturating_sub(PAGE_SIZE);
                self.selected = self.page_offset;
                Transition::Stay
            }
            Key::NextPage => {
                let next = (self.page_offset + PAGE_SIZE).min(last_page_start(total));
                if next != self.page_offset {
                    self.page_offset = next;
                    self.selected = next;
                }
                Transition::Stay
            }
            Key::Confirm => self.confirm(listing),
            Key::Back => self.back(),
            Key::Cancel | Key::Interrupt => Transition::Cancelled,
            Key::Other => Transition::Stay,
        }
    }

    /// Indices of the rows on the current page.
    #[must_use]
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let start = self.page_offset.min(total);
        start..(start + PAGE_SIZE).min(total)
    }

    /// `(current page, page count)`, both 1-based; an empty listing has one page.
    #[must_use]
    pub fn page_info(&self, total: usize) -> (usize, usize) {
        let pages = total.div_ceil(PAGE_SIZE).max(1);
        (self.page_offset / PAGE_SIZE + 1, pages)
    }

    /// Keep the selection inside a listing of `total` rows.
    pub fn clamp(&mut self, total: usize) {
        if total == 0 {
            self.reset();
            return;
        }
        self.selected = self.selected.min(total - 1);
        self.page_offset = self.page_offset.min(last_page_start(total));
        self.snap();
    }

    fn confirm(&mut self, listing: &Listing) -> Transition {
        let Some(entry) = listing.get(self.selected) else {
            return Transition::Stay;
        };

        if entry.is_dir {
            self.current = self.current.join(&entry.name);
            self.reset();
            return Transition::Descended;
        }

        if self.accepts(&entry.name) {
            Transition::Selected(self.current.join(&entry.name))
        } else {
            Transition::Rejected(entry.name.clone())
        }
    }

    fn back(&mut self) -> Transition {
        if self.go_up() {
            Transition::Ascended
        } else {
            Transition::Stay
        }
    }

    /// Move the window so that it contains the selection.
    fn snap(&mut self) {
        if self.selected < self.page_offset || self.selected >= self.page_offset + PAGE_SIZE {
            self.page_offset = (self.selected / PAGE_SIZE) * PAGE_SIZE;
        }
    }

    fn reset(&mut self) {
        self.selected = 0;
        self.page_offset = 0;
    }
}

fn last_page_start(total: usize) -> usize {
    (total.saturating_sub(1) / PAGE_SIZE) * PAGE_SIZE
}
