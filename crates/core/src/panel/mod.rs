//! List-view controller for the bookmark store.
//!
//! `BookmarkPanel` holds only view state (the single selection and the
//! address column width). The store is borrowed on each call, so the panel
//! never owns bookmark data. Rendering produces `RowView`s made of colored
//! spans; the host decides how to paint them.

use serde::Serialize;
use tracing::debug;

use crate::host::{BinaryView, MetadataStore, TextPrompt, Theme};
use crate::model::{Bookmark, Color, ColorRole};
use crate::store::{BookmarkEvent, BookmarkResult, BookmarkStore};

/// Default width of the zero-padded hexadecimal address column.
pub const DEFAULT_ADDRESS_WIDTH: usize = 8;

const ADD_TITLE: &str = "Create bookmark";
const ADD_PROMPT: &str = "Enter bookmark name:";
const RENAME_TITLE: &str = "Rename bookmark";
const RENAME_PROMPT: &str = "Enter new bookmark name:";

/// A run of text with an optional semantic color. `None` marks separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub color: Option<Color>,
    pub text: String,
}

impl Span {
    fn colored(color: Color, text: impl Into<String>) -> Self {
        Self { color: Some(color), text: text.into() }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self { color: None, text: text.into() }
    }
}

/// One display line of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    /// Concatenated text of all spans, without colors.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Rendered form of one bookmark row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub row: usize,
    pub address: u64,
    pub label: String,
    pub lines: Vec<Line>,
}

/// Context menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Add,
    Rename,
    Remove,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Add => "Add...",
            MenuAction::Rename => "Rename...",
            MenuAction::Remove => "Remove",
        }
    }
}

/// One entry of the context menu with its enabled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub action: MenuAction,
    pub enabled: bool,
}

/// Result of a user interaction with the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutcome {
    Navigated(u64),
    /// The host declined to move the cursor.
    NavigationRefused(u64),
    Inserted { row: usize },
    Renamed { row: usize },
    Removed(Bookmark),
    /// The prompt was dismissed or answered with an empty string.
    Cancelled,
    /// The action needs a selection and there is none.
    Unavailable,
}

/// Selection state and action dispatch for the bookmark list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkPanel {
    selection: Option<usize>,
    address_width: usize,
}

impl Default for BookmarkPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkPanel {
    pub fn new() -> Self {
        Self { selection: None, address_width: DEFAULT_ADDRESS_WIDTH }
    }

    /// Builder-style helper to change the address column width.
    pub fn with_address_width(mut self, width: usize) -> Self {
        self.address_width = width;
        self
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Select `row`, or clear the selection with `None`.
    ///
    /// Returns `false` (and leaves the selection untouched) for rows that do
    /// not exist in `store`.
    pub fn select<M>(&mut self, store: &BookmarkStore<M>, row: Option<usize>) -> bool {
        match row {
            Some(r) if r >= store.len() => false,
            _ => {
                self.selection = row;
                true
            }
        }
    }

    /// Keep the selection pointing at the same bookmark after a store change.
    pub fn apply_event(&mut self, event: &BookmarkEvent) {
        self.selection = match (*event, self.selection) {
            (BookmarkEvent::Reset, _) => None,
            (BookmarkEvent::Inserted { row }, Some(sel)) if row <= sel => Some(sel + 1),
            (BookmarkEvent::Removed { row }, Some(sel)) if row == sel => None,
            (BookmarkEvent::Removed { row }, Some(sel)) if row < sel => Some(sel - 1),
            (_, sel) => sel,
        };
    }

    /// Context menu entries. Rename and Remove need a selection.
    pub fn context_menu(&self) -> Vec<MenuEntry> {
        let has_selection = self.selection.is_some();
        vec![
            MenuEntry { action: MenuAction::Add, enabled: true },
            MenuEntry { action: MenuAction::Rename, enabled: has_selection },
            MenuEntry { action: MenuAction::Remove, enabled: has_selection },
        ]
    }

    /// Render every row of `store`.
    pub fn render<M>(
        &self,
        store: &BookmarkStore<M>,
        view: &dyn BinaryView,
        theme: &dyn Theme,
    ) -> Vec<RowView> {
        (0..store.len()).filter_map(|row| self.render_row(store, row, view, theme)).collect()
    }

    /// Render a single row: the header line, the symbol at the address, and
    /// one line per enclosing function that does not start at the address.
    pub fn render_row<M>(
        &self,
        store: &BookmarkStore<M>,
        row: usize,
        view: &dyn BinaryView,
        theme: &dyn Theme,
    ) -> Option<RowView> {
        let bookmark = store.get(row)?;
        let fg = theme.color(ColorRole::Foreground);
        let addr_color = theme.color(ColorRole::Address);
        let sym_color = theme.color(ColorRole::Symbol);
        let address = bookmark.address;

        let width = self.address_width;
        let mut lines = vec![Line {
            spans: vec![
                Span::colored(addr_color, format!("{address:0width$x}")),
                Span::plain(" "),
                Span::colored(fg, bookmark.label.clone()),
            ],
        }];

        if let Some(symbol) = view.symbol_at(address) {
            lines.push(Line {
                spans: vec![
                    Span::plain("  "),
                    Span::colored(fg, "at"),
                    Span::plain(" "),
                    Span::colored(sym_color, symbol.short_name),
                ],
            });
        }

        for func in view.functions_containing(address) {
            if func.start == address {
                continue;
            }
            let (sign, offset) = if address > func.start {
                (" + ", address - func.start)
            } else {
                (" - ", func.start - address)
            };
            lines.push(Line {
                spans: vec![
                    Span::plain("  "),
                    Span::colored(fg, "at"),
                    Span::plain(" "),
                    Span::colored(sym_color, func.symbol.short_name),
                    Span::colored(fg, sign),
                    Span::colored(addr_color, format!("{offset:x}")),
                ],
            });
        }

        Some(RowView { row, address, label: bookmark.label.clone(), lines })
    }

    /// Move the view's cursor to the bookmark at `row` (double-click).
    pub fn activate<M>(
        &self,
        store: &BookmarkStore<M>,
        row: usize,
        view: &mut dyn BinaryView,
    ) -> PanelOutcome {
        let Some(bookmark) = store.get(row) else {
            return PanelOutcome::Unavailable;
        };
        if view.navigate(bookmark.address) {
            debug!(address = bookmark.address, "navigated to bookmark");
            PanelOutcome::Navigated(bookmark.address)
        } else {
            PanelOutcome::NavigationRefused(bookmark.address)
        }
    }

    /// Dispatch a context menu action. Disabled actions report `Unavailable`.
    pub fn trigger<M: MetadataStore>(
        &mut self,
        action: MenuAction,
        store: &mut BookmarkStore<M>,
        prompt: &mut dyn TextPrompt,
        view: &dyn BinaryView,
    ) -> BookmarkResult<PanelOutcome> {
        match action {
            MenuAction::Add => self.add(store, prompt, view),
            MenuAction::Rename => self.rename(store, prompt),
            MenuAction::Remove => self.remove(store),
        }
    }

    /// "Add...": prompt for a label and bookmark the view's cursor address.
    pub fn add<M: MetadataStore>(
        &mut self,
        store: &mut BookmarkStore<M>,
        prompt: &mut dyn TextPrompt,
        view: &dyn BinaryView,
    ) -> BookmarkResult<PanelOutcome> {
        let Some(label) = ask(prompt, ADD_TITLE, ADD_PROMPT) else {
            return Ok(PanelOutcome::Cancelled);
        };
        let row = store.insert(view.current_offset(), label)?;
        self.apply_event(&BookmarkEvent::Inserted { row });
        Ok(PanelOutcome::Inserted { row })
    }

    /// "Rename...": prompt for a new label for the selected row.
    pub fn rename<M: MetadataStore>(
        &mut self,
        store: &mut BookmarkStore<M>,
        prompt: &mut dyn TextPrompt,
    ) -> BookmarkResult<PanelOutcome> {
        let Some(row) = self.valid_selection(store) else {
            return Ok(PanelOutcome::Unavailable);
        };
        let Some(label) = ask(prompt, RENAME_TITLE, RENAME_PROMPT) else {
            return Ok(PanelOutcome::Cancelled);
        };
        store.rename(row, label)?;
        Ok(PanelOutcome::Renamed { row })
    }

    /// "Remove": delete the selected row.
    pub fn remove<M: MetadataStore>(
        &mut self,
        store: &mut BookmarkStore<M>,
    ) -> BookmarkResult<PanelOutcome> {
        let Some(row) = self.valid_selection(store) else {
            return Ok(PanelOutcome::Unavailable);
        };
        let removed = store.remove(row)?;
        self.apply_event(&BookmarkEvent::Removed { row });
        Ok(PanelOutcome::Removed(removed))
    }

    fn valid_selection<M>(&self, store: &BookmarkStore<M>) -> Option<usize> {
        self.selection.filter(|&row| row < store.len())
    }
}

fn ask(prompt: &mut dyn TextPrompt, title: &str, message: &str) -> Option<String> {
    prompt.text_line_input(title, message).filter(|s| !s.is_empty())
}
