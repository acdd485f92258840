//! Command implementations.

pub mod menu;
pub mod operation;
pub mod store;
