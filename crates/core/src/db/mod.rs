//! Project database integration and project layout definitions.
//!
//! This module wraps a SQLite database storing:
//! - Binaries registered with the project
//! - Per-binary key/value metadata (where the `bookmarks` list lives)
//!
//! It defines:
//! - `ProjectConfig` / `DbConfig` / `ThemeConfig`: serializable project settings.
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectDb`: a small SQLite wrapper with versioned schema.
//! - `ScopedMetadata`: a `MetadataStore` view of one binary's metadata.
//! - `ProjectContext`: layout + config + open database in one bundle.

pub mod config;
pub mod context;
pub mod layout;
pub mod metadata;
pub mod models;
pub mod project_db;

pub use config::*;
pub use context::*;
pub use layout::*;
pub use metadata::*;
pub use models::*;
pub use project_db::*;
