//! Plugin lifecycle: attaching a bookmarks panel to every opened view.
//!
//! The host owns a `ViewHooks` list and runs it whenever a view frame opens.
//! `BookmarksPlugin::install` adds the bookmarks init callback to that list;
//! `uninstall` removes it again on teardown or reload. Each frame owns the
//! `BookmarkView` created for it, so there is no registry of open panels.

use std::fmt;

use tracing::{debug, info};

use crate::host::{BinaryView, MetadataStore, TabContainer, TabId, TextPrompt, Theme};
use crate::panel::{BookmarkPanel, MenuAction, PanelOutcome, RowView};
use crate::store::{BookmarkEvent, BookmarkResult, BookmarkStore};

/// Title of the tab the panel registers under.
pub const TAB_TITLE: &str = "Bookmarks";

/// Per-view bookmarks context: the store, its panel, and the tab it lives in.
///
/// The store is only reachable mutably through the panel, so the selection
/// always tracks the bookmark it was made on.
#[derive(Debug)]
pub struct BookmarkView<M> {
    store: BookmarkStore<M>,
    panel: BookmarkPanel,
    tab: TabId,
}

impl<M: MetadataStore> BookmarkView<M> {
    /// Load the store from `metadata` and register a tab for the panel.
    pub fn open(
        metadata: M,
        tabs: &mut dyn TabContainer,
        panel: BookmarkPanel,
    ) -> BookmarkResult<Self> {
        let store = BookmarkStore::load(metadata)?;
        let tab = tabs.add_tab(TAB_TITLE);
        Ok(Self { store, panel, tab })
    }

    pub fn trigger(
        &mut self,
        action: MenuAction,
        prompt: &mut dyn TextPrompt,
        view: &dyn BinaryView,
    ) -> BookmarkResult<PanelOutcome> {
        self.panel.trigger(action, &mut self.store, prompt, view)
    }

    /// Re-read the persisted list. The selection is cleared.
    pub fn reload(&mut self) -> BookmarkResult<()> {
        self.store.reload()?;
        self.panel.apply_event(&BookmarkEvent::Reset);
        Ok(())
    }
}

impl<M> BookmarkView<M> {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn store(&self) -> &BookmarkStore<M> {
        &self.store
    }

    pub fn panel(&self) -> &BookmarkPanel {
        &self.panel
    }

    pub fn select(&mut self, row: Option<usize>) -> bool {
        self.panel.select(&self.store, row)
    }

    pub fn activate(&self, row: usize, view: &mut dyn BinaryView) -> PanelOutcome {
        self.panel.activate(&self.store, row, view)
    }

    pub fn render(&self, view: &dyn BinaryView, theme: &dyn Theme) -> Vec<RowView> {
        self.panel.render(&self.store, view, theme)
    }

    /// Unregister the tab and hand back the metadata handle.
    pub fn close(self, tabs: &mut dyn TabContainer) -> M {
        tabs.remove_tab(self.tab);
        self.store.into_metadata()
    }
}

/// A view frame as seen by the plugin.
pub trait ViewFrame {
    type Metadata: MetadataStore;

    /// Metadata handle scoped to the frame's binary.
    fn open_metadata(&mut self) -> Self::Metadata;

    fn tabs(&mut self) -> &mut dyn TabContainer;

    /// Panel configuration for this frame.
    fn panel_settings(&self) -> BookmarkPanel {
        BookmarkPanel::new()
    }

    /// Take ownership of the bookmarks context created for this frame.
    fn attach_bookmarks(&mut self, view: BookmarkView<Self::Metadata>);
}

/// Callback run when a view frame opens.
pub type InitCallback<F> = fn(&mut F) -> BookmarkResult<()>;

/// Identifier returned by `ViewHooks::register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// The host's list of view-open callbacks.
pub struct ViewHooks<F> {
    next_id: u64,
    callbacks: Vec<(HookId, InitCallback<F>)>,
}

impl<F> Default for ViewHooks<F> {
    fn default() -> Self {
        Self { next_id: 0, callbacks: Vec::new() }
    }
}

impl<F> fmt::Debug for ViewHooks<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<u64> = self.callbacks.iter().map(|(id, _)| id.0).collect();
        f.debug_struct("ViewHooks").field("next_id", &self.next_id).field("hooks", &ids).finish()
    }
}

impl<F> ViewHooks<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, callback: InitCallback<F>) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: HookId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(hook, _)| *hook != id);
        before != self.callbacks.len()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every registered callback against a newly opened frame.
    pub fn open_view(&self, frame: &mut F) -> BookmarkResult<()> {
        for (id, callback) in &self.callbacks {
            debug!(hook = id.0, "running view init callback");
            callback(frame)?;
        }
        Ok(())
    }
}

/// Handle for the installed bookmarks init callback.
#[derive(Debug, PartialEq, Eq)]
pub struct BookmarksPlugin {
    hook: HookId,
}

impl BookmarksPlugin {
    pub fn install<F: ViewFrame>(hooks: &mut ViewHooks<F>) -> Self {
        let hook = hooks.register(attach_to_frame::<F>);
        info!(hook = hook.0, "bookmarks plugin installed");
        Self { hook }
    }

    /// Remove the init callback. Frames that already own a panel keep it.
    pub fn uninstall<F>(self, hooks: &mut ViewHooks<F>) -> bool {
        let removed = hooks.unregister(self.hook);
        info!(hook = self.hook.0, removed, "bookmarks plugin uninstalled");
        removed
    }

    /// Tear down the previous registration and install a fresh one.
    pub fn reload<F: ViewFrame>(self, hooks: &mut ViewHooks<F>) -> Self {
        self.uninstall(hooks);
        Self::install(hooks)
    }

    pub fn hook(&self) -> HookId {
        self.hook
    }
}

fn attach_to_frame<F: ViewFrame>(frame: &mut F) -> BookmarkResult<()> {
    let metadata = frame.open_metadata();
    let panel = frame.panel_settings();
    let view = BookmarkView::open(metadata, frame.tabs(), panel)?;
    debug!(bookmarks = view.store.len(), "attached bookmarks panel");
    frame.attach_bookmarks(view);
    Ok(())
}
