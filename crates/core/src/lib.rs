//! bookmark-core
//!
//! Core library for address bookmarks on a disassembler view.
//!
//! This crate defines the bookmark model, the persisted bookmark store, the
//! list-panel controller, the plugin lifecycle, and a headless host built on
//! a SQLite project database and an object-file symbol index.
//!
//! The host application (disassembler) is abstracted behind the traits in
//! [`host`], so all logic here is testable without a GUI.

pub mod model;
pub mod host;
pub mod store;
pub mod panel;
pub mod plugin;
pub mod db;
pub mod symbols;
pub mod headless;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
