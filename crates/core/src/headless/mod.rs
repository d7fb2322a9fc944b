//! A host implementation without a GUI.
//!
//! `HeadlessFrame` plays the part of a disassembler's view frame: it owns a
//! `HeadlessView` (symbol table + cursor), a `TabBar`, and, once the plugin's
//! init callback has run, the frame's `BookmarkView`. Metadata is read from
//! and written to a `ProjectDb`, scoped to one registered binary.

use crate::db::{ProjectDb, ScopedMetadata};
use crate::host::{BinaryView, TabContainer, TabId};
use crate::model::{Function, Symbol};
use crate::panel::BookmarkPanel;
use crate::plugin::{BookmarkView, ViewFrame};
use crate::symbols::SymbolIndex;

/// `BinaryView` over a symbol index with a movable cursor.
#[derive(Debug, Clone, Default)]
pub struct HeadlessView {
    symbols: SymbolIndex,
    cursor: u64,
}

impl HeadlessView {
    pub fn new(symbols: SymbolIndex) -> Self {
        Self { symbols, cursor: 0 }
    }

    pub fn symbols(&self) -> &SymbolIndex {
        &self.symbols
    }
}

impl BinaryView for HeadlessView {
    fn symbol_at(&self, address: u64) -> Option<Symbol> {
        self.symbols.symbol_at(address)
    }

    fn functions_containing(&self, address: u64) -> Vec<Function> {
        self.symbols.functions_containing(address)
    }

    fn current_offset(&self) -> u64 {
        self.cursor
    }

    fn navigate(&mut self, address: u64) -> bool {
        self.cursor = address;
        true
    }
}

/// Ordered list of tab titles.
#[derive(Debug, Clone, Default)]
pub struct TabBar {
    next_id: usize,
    tabs: Vec<(TabId, String)>,
}

impl TabBar {
    pub fn titles(&self) -> Vec<&str> {
        self.tabs.iter().map(|(_, title)| title.as_str()).collect()
    }
}

impl TabContainer for TabBar {
    fn add_tab(&mut self, title: &str) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;
        self.tabs.push((id, title.to_string()));
        id
    }

    fn remove_tab(&mut self, id: TabId) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|(tab, _)| *tab != id);
        before != self.tabs.len()
    }
}

/// View frame for one binary in a project database.
#[derive(Debug)]
pub struct HeadlessFrame<'db> {
    db: &'db ProjectDb,
    binary: &'db str,
    pub view: HeadlessView,
    pub tabs: TabBar,
    panel: BookmarkPanel,
    bookmarks: Option<BookmarkView<ScopedMetadata<'db>>>,
}

impl<'db> HeadlessFrame<'db> {
    pub fn new(db: &'db ProjectDb, binary: &'db str, view: HeadlessView) -> Self {
        Self {
            db,
            binary,
            view,
            tabs: TabBar::default(),
            panel: BookmarkPanel::new(),
            bookmarks: None,
        }
    }

    /// Builder-style helper to configure the panel created for this frame.
    pub fn with_panel(mut self, panel: BookmarkPanel) -> Self {
        self.panel = panel;
        self
    }

    pub fn binary(&self) -> &str {
        self.binary
    }

    pub fn bookmarks(&self) -> Option<&BookmarkView<ScopedMetadata<'db>>> {
        self.bookmarks.as_ref()
    }

    /// Borrow the bookmarks context and the view at the same time.
    pub fn parts_mut(
        &mut self,
    ) -> Option<(&mut BookmarkView<ScopedMetadata<'db>>, &mut HeadlessView)> {
        let view = &mut self.view;
        self.bookmarks.as_mut().map(|bookmarks| (bookmarks, view))
    }

    /// Detach the bookmarks panel and drop its tab. Returns whether one was attached.
    pub fn close_bookmarks(&mut self) -> bool {
        match self.bookmarks.take() {
            Some(bookmarks) => {
                bookmarks.close(&mut self.tabs);
                true
            }
            None => false,
        }
    }
}

impl<'db> ViewFrame for HeadlessFrame<'db> {
    type Metadata = ScopedMetadata<'db>;

    fn open_metadata(&mut self) -> Self::Metadata {
        ScopedMetadata::new(self.db, self.binary)
    }

    fn tabs(&mut self) -> &mut dyn TabContainer {
        &mut self.tabs
    }

    fn panel_settings(&self) -> BookmarkPanel {
        self.panel.clone()
    }

    fn attach_bookmarks(&mut self, view: BookmarkView<Self::Metadata>) {
        self.bookmarks = Some(view);
    }
}
