use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use bookmark_core::db::{ProjectContext, ScopedMetadata};
use bookmark_core::headless::{HeadlessFrame, HeadlessView};
use bookmark_core::host::{BinaryView, FixedPrompt};
use bookmark_core::panel::{BookmarkPanel, MenuAction, PanelOutcome};
use bookmark_core::plugin::{BookmarkView, BookmarksPlugin, ViewHooks};

use crate::canonicalize_or_current;
use crate::commands::load_symbols;
use crate::parse_address;

/// Output format for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookmarkExport {
    pub binary: String,
    pub bookmarks: Vec<ExportedBookmark>,
}

#[derive(Debug, Serialize)]
pub struct ExportedBookmark {
    pub address: u64,
    pub address_hex: String,
    pub label: String,
    /// Symbol defined exactly at the address, if any.
    pub symbol: Option<String>,
    /// Enclosing functions that start elsewhere, as `name + offset`.
    pub functions: Vec<String>,
}

type AttachedView<'db> = BookmarkView<ScopedMetadata<'db>>;

/// Open `binary` in a headless frame with the bookmarks plugin attached and run `f` on it.
fn with_frame<T>(
    root: &str,
    binary: &str,
    f: impl FnOnce(&mut HeadlessFrame<'_>, &ProjectContext) -> Result<T>,
) -> Result<T> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;
    let record = ctx.require_binary(binary)?;
    let symbols = load_symbols(&ctx, &record);
    debug!(binary, symbols = symbols.len(), "opening headless frame");

    let panel = BookmarkPanel::new().with_address_width(ctx.config.address_width);
    let mut frame =
        HeadlessFrame::new(&ctx.db, &record.name, HeadlessView::new(symbols)).with_panel(panel);

    let mut hooks = ViewHooks::new();
    let plugin = BookmarksPlugin::install(&mut hooks);
    hooks
        .open_view(&mut frame)
        .with_context(|| format!("Failed to load bookmarks for '{}'", record.name))?;

    let result = f(&mut frame, &ctx);
    frame.close_bookmarks();
    plugin.uninstall(&mut hooks);
    result
}

fn attached<'f, 'db>(
    frame: &'f mut HeadlessFrame<'db>,
) -> Result<(&'f mut AttachedView<'db>, &'f mut HeadlessView)> {
    frame.parts_mut().ok_or_else(|| anyhow!("Bookmarks panel is not attached to this view"))
}

fn select_row(bookmarks: &mut AttachedView<'_>, row: usize) -> Result<()> {
    if !bookmarks.select(Some(row)) {
        bail!("Row {} does not exist ({} bookmarks)", row, bookmarks.store().len());
    }
    Ok(())
}

/// Print the rendered bookmark rows for a binary.
pub fn list_bookmarks_command(root: &str, binary: &str, json: bool) -> Result<()> {
    with_frame(root, binary, |frame, ctx| {
        let theme = ctx.config.theme.to_theme();
        let bookmarks = frame.bookmarks().ok_or_else(|| anyhow!("Bookmarks panel missing"))?;
        let rows = bookmarks.render(&frame.view, &theme);

        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!("Bookmarks for {} ({}):", binary, rows.len());
        if rows.is_empty() {
            println!("(none)");
        }
        for row in rows {
            for (i, line) in row.lines.iter().enumerate() {
                if i == 0 {
                    println!("[{}] {}", row.row, line.text());
                } else {
                    println!("    {}", line.text());
                }
            }
        }
        Ok(())
    })
}

/// Bookmark `address` with `label`, the way "Add..." does at the cursor.
pub fn add_bookmark_command(root: &str, binary: &str, address: &str, label: &str) -> Result<()> {
    let address = parse_address(address)?;
    with_frame(root, binary, |frame, _ctx| {
        let (bookmarks, view) = attached(frame)?;
        view.navigate(address);
        let mut prompt = FixedPrompt::answering(label);
        match bookmarks.trigger(MenuAction::Add, &mut prompt, &*view)? {
            PanelOutcome::Inserted { row } => {
                println!("Added bookmark:");
                println!("  Row: {}", row);
                println!("  Address: {:#x}", address);
                println!("  Label: {}", label);
                Ok(())
            }
            PanelOutcome::Cancelled => bail!("Bookmark label must not be empty"),
            other => bail!("Unexpected result while adding bookmark: {:?}", other),
        }
    })
}

/// Give the bookmark at `row` a new label.
pub fn rename_bookmark_command(root: &str, binary: &str, row: usize, label: &str) -> Result<()> {
    with_frame(root, binary, |frame, _ctx| {
        let (bookmarks, view) = attached(frame)?;
        select_row(bookmarks, row)?;
        let mut prompt = FixedPrompt::answering(label);
        match bookmarks.trigger(MenuAction::Rename, &mut prompt, &*view)? {
            PanelOutcome::Renamed { row } => {
                println!("Renamed bookmark {} to '{}'", row, label);
                Ok(())
            }
            PanelOutcome::Cancelled => bail!("Bookmark label must not be empty"),
            other => bail!("Unexpected result while renaming bookmark: {:?}", other),
        }
    })
}

/// Delete the bookmark at `row`.
pub fn remove_bookmark_command(root: &str, binary: &str, row: usize) -> Result<()> {
    with_frame(root, binary, |frame, _ctx| {
        let (bookmarks, view) = attached(frame)?;
        select_row(bookmarks, row)?;
        let mut prompt = FixedPrompt::cancelled();
        match bookmarks.trigger(MenuAction::Remove, &mut prompt, &*view)? {
            PanelOutcome::Removed(removed) => {
                println!("Removed bookmark {:#x} {}", removed.address, removed.label);
                Ok(())
            }
            other => bail!("Unexpected result while removing bookmark: {:?}", other),
        }
    })
}

/// Activate the bookmark at `row` and report where the cursor went.
pub fn goto_bookmark_command(root: &str, binary: &str, row: usize) -> Result<()> {
    with_frame(root, binary, |frame, _ctx| {
        let (bookmarks, view) = attached(frame)?;
        match bookmarks.activate(row, &mut *view) {
            PanelOutcome::Navigated(address) => {
                let label = bookmarks.store().get(row).map(|b| b.label.as_str()).unwrap_or("");
                println!("Cursor: {:#x} ({})", address, label);
                if let Some(symbol) = view.symbol_at(address) {
                    println!("Symbol: {}", symbol.short_name);
                }
                Ok(())
            }
            PanelOutcome::NavigationRefused(address) => {
                bail!("The view refused to navigate to {:#x}", address)
            }
            _ => bail!("Row {} does not exist ({} bookmarks)", row, bookmarks.store().len()),
        }
    })
}

/// Write the bookmark list with symbol context to a JSON or YAML file.
pub fn export_bookmarks_command(
    root: &str,
    binary: &str,
    format: ExportFormat,
    output: Option<String>,
) -> Result<()> {
    with_frame(root, binary, |frame, ctx| {
        let bookmarks = frame.bookmarks().ok_or_else(|| anyhow!("Bookmarks panel missing"))?;
        let export = BookmarkExport {
            binary: frame.binary().to_string(),
            bookmarks: bookmarks
                .store()
                .iter()
                .map(|b| ExportedBookmark {
                    address: b.address,
                    address_hex: format!("{:#x}", b.address),
                    label: b.label.clone(),
                    symbol: frame.view.symbol_at(b.address).map(|s| s.short_name),
                    functions: frame
                        .view
                        .functions_containing(b.address)
                        .into_iter()
                        .filter(|f| f.start != b.address)
                        .map(|f| describe_offset(&f.symbol.short_name, f.start, b.address))
                        .collect(),
                })
                .collect(),
        };

        let body = match format {
            ExportFormat::Json => serde_json::to_string_pretty(&export)?,
            ExportFormat::Yaml => serde_yaml::to_string(&export)?,
        };

        let path = match output {
            Some(p) => PathBuf::from(p),
            None => ctx.layout.export_path(frame.binary(), format.extension()),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, body)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;

        println!("Exported {} bookmarks to {}", export.bookmarks.len(), path.display());
        Ok(())
    })
}

fn describe_offset(name: &str, start: u64, address: u64) -> String {
    if address >= start {
        format!("{} + {:#x}", name, address - start)
    } else {
        format!("{} - {:#x}", name, start - address)
    }
}
