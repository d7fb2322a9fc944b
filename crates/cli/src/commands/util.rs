use std::path::Path;

use tracing::warn;

use bookmark_core::db::{BinaryRecord, ProjectContext};
use bookmark_core::symbols::SymbolIndex;

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Read the symbol table of a registered binary.
///
/// A missing or unreadable file yields an empty index: bookmarks still work,
/// rows just carry no symbol lines.
pub fn load_symbols(ctx: &ProjectContext, record: &BinaryRecord) -> SymbolIndex {
    let path = ctx.binary_path(record);
    match SymbolIndex::from_path(&path) {
        Ok(index) => index,
        Err(err) => {
            warn!(binary = %record.name, error = %err, "continuing without symbols");
            SymbolIndex::default()
        }
    }
}
