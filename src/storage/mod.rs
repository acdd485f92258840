//! SQLite storage layer.
//!
//! This module wraps the ticketing backend's record store:
//! - Live schema introspection (the column set is never hardcoded)
//! - Dynamic projections and inserts built from that column set
//! - One transaction per import batch, committed once
//!
//! # Submodules
//!
//! - [`sqlite`] - Main SQLite storage implementation

pub mod sqlite;

#[cfg(test)]
pub(crate) mod testing;

pub use sqlite::{
    Row, SqliteStorage, UPDATE_ENTRIES_TABLE, UpdateEntry, insert_record, insert_update_entry,
    is_connectivity_error, quote_ident, value_to_text,
};
