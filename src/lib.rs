//! HelpHub import/export
//!
//! This crate provides the core functionality for the `hhsync` CLI tool,
//! which moves customers and support tickets between the ticketing
//! backend's SQLite store and XML documents.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap, plus the interactive menu
//! - [`browser`] - Keyboard-driven file browser
//! - [`storage`] - SQLite record store with live schema introspection
//! - [`sync`] - XML import/export operations
//! - [`validate`] - Pre-flight document path checks
//! - [`config`] - Store resolution and default document locations
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
