//! Interactive file browser.
//!
//! - [`state`] - Pure navigation state machine
//! - [`listing`] - Directory snapshots and the filesystem lister
//! - [`keys`] - Key events and where they come from
//! - [`view`] - The redraw/read loop tying them together

pub mod keys;
pub mod listing;
pub mod state;
pub mod view;

pub use keys::{Key, KeySource, ScriptedKeys, TerminalKeys, map_key};
pub use listing::{DirectoryLister, FsLister, ListEntry, Listing};
pub use state::{FileBrowser, PAGE_SIZE, Transition};
pub use view::{BrowseOptions, browse};
