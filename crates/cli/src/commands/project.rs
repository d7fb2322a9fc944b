use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;

use bookmark_core::db::{
    BinaryRecord, ProjectConfig, ProjectContext, ProjectDb, ProjectLayout, ScopedMetadata,
};
use bookmark_core::store::BookmarkStore;

use crate::commands::print_dir_status;
use crate::{canonicalize_or_current, infer_project_name};

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub description: Option<String>,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub address_width: usize,
    pub theme: bookmark_core::db::ThemeConfig,
    pub layout: ProjectInfoLayout,
    pub binaries: Vec<BinaryInfo>,
}

#[derive(Serialize)]
pub struct ProjectInfoLayout {
    pub meta_dir: String,
    pub exports_dir: String,
}

/// A registered binary together with how many bookmarks it carries.
#[derive(Serialize)]
pub struct BinaryInfo {
    #[serde(flatten)]
    pub record: BinaryRecord,
    /// `None` when the stored bookmark list could not be read.
    pub bookmarks: Option<usize>,
}

/// Initialize a new project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.exports_dir).with_context(|| {
        format!("Failed to create exports dir: {}", layout.exports_dir.display())
    })?;

    let config = ProjectConfig::new(&project_name, layout.db_path_relative_string());
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the database now so later commands can rely on its presence.
    ProjectDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    println!("Initialized bookmarks project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Exports dir: {}", layout.exports_dir.display());

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ProjectContext { layout, config, db, .. } = ProjectContext::from_root(&root_path)?;
    let binaries: Vec<BinaryInfo> = db
        .list_binaries()
        .context("Failed to list binaries")?
        .into_iter()
        .map(|record| {
            let bookmarks = BookmarkStore::load(ScopedMetadata::new(&db, &record.name))
                .map(|store| store.len())
                .ok();
            BinaryInfo { record, bookmarks }
        })
        .collect();

    if json {
        let snapshot = ProjectInfoSnapshot {
            name: config.name.clone(),
            description: config.description.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.project_config_path.display().to_string(),
            config_version: config.config_version.clone(),
            db_path: config.db.path.clone(),
            address_width: config.address_width,
            theme: config.theme.clone(),
            layout: ProjectInfoLayout {
                meta_dir: layout.meta_dir.display().to_string(),
                exports_dir: layout.exports_dir.display().to_string(),
            },
            binaries,
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Bookmarks Project Info");
    println!("======================");
    println!("Name: {}", config.name);
    if let Some(desc) = &config.description {
        println!("Description: {}", desc);
    }
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    println!("Address width: {}", config.address_width);
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.bookmarks)", &layout.meta_dir);
    print_dir_status("Exports dir", &layout.exports_dir);
    println!();

    println!("Binaries: {}", binaries.len());
    for info in &binaries {
        let count = match info.bookmarks {
            Some(n) => n.to_string(),
            None => "unreadable".to_string(),
        };
        println!("- {} ({} bookmarks)", info.record.name, count);
    }

    Ok(())
}
