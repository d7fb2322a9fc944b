use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use bookmark_core::db::{BinaryRecord, ProjectContext};

use crate::{canonicalize_or_current, sha256_file};

/// Register a binary in the project database.
pub fn add_binary_command(
    root: &str,
    path: &str,
    name: Option<String>,
    arch: Option<String>,
    hash: Option<String>,
    skip_hash: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let input_path = Path::new(path);
    let abs_path = ctx.layout.resolve(input_path);

    if !abs_path.exists() {
        return Err(anyhow!("Binary file does not exist: {}", abs_path.display()));
    }

    // Store path relative to project root when possible.
    let rel_path = abs_path
        .canonicalize()
        .ok()
        .and_then(|abs_canon| {
            root_path.canonicalize().ok().and_then(|root_canon| {
                abs_canon.strip_prefix(&root_canon).ok().map(|p| p.to_path_buf())
            })
        })
        .or_else(|| abs_path.strip_prefix(&root_path).ok().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| abs_path.clone());

    let binary_name = name.unwrap_or_else(|| {
        input_path.file_name().and_then(|os| os.to_str()).unwrap_or(path).to_string()
    });

    let hash = match (hash, skip_hash) {
        (Some(h), _) => Some(h),
        (None, true) => None,
        (None, false) => Some(sha256_file(&abs_path)?),
    };

    let record = BinaryRecord {
        name: binary_name,
        path: rel_path.to_string_lossy().to_string(),
        arch,
        hash,
    };
    let id = ctx.db.insert_binary(&record).context("Failed to insert binary record")?;
    info!(id, name = %record.name, "registered binary");

    println!("Added binary:");
    println!("  Id: {}", id);
    println!("  Name: {}", record.name);
    println!("  Path (relative): {}", record.path);
    println!("  DB: {}", ctx.db_path.display());

    Ok(())
}

/// List all binaries registered in the project database.
pub fn list_binaries_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let binaries = ctx.db.list_binaries().context("Failed to list binaries")?;

    if json {
        let serialized = serde_json::to_string_pretty(&binaries)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Binaries:");
    if binaries.is_empty() {
        println!("(none)");
        return Ok(());
    }

    for bin in binaries {
        let arch_display = bin.arch.as_deref().unwrap_or("(unspecified)");
        let hash_display = bin.hash.as_deref().unwrap_or("(none)");
        println!(
            "- {} (path: {}, arch: {}, hash: {})",
            bin.name, bin.path, arch_display, hash_display
        );
    }

    Ok(())
}
