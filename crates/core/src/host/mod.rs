//! Interfaces to the collaborators a host application provides.
//!
//! The bookmark store and panel never talk to a GUI toolkit or an analysis
//! engine directly. Everything they need goes through these traits:
//! - `MetadataStore`: key/value metadata scoped to one loaded binary.
//! - `BinaryView`: symbol lookups and the active view's cursor.
//! - `TextPrompt`: a single-line text input dialog.
//! - `Theme`: semantic color lookup.
//! - `TabContainer`: the per-view tab widget the panel is registered into.
//!
//! `MemoryMetadata` and `StaticTheme` are small in-process implementations
//! used by the headless host and by tests.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::model::{Color, ColorRole, Function, Symbol};

/// Failure reported by a host collaborator.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("metadata backend error: {0}")]
    Metadata(String),
}

/// Key/value metadata persisted alongside one binary's analysis database.
pub trait MetadataStore {
    /// Return the value stored under `key`, or `None` if the key is absent.
    fn query_metadata(&self, key: &str) -> Result<Option<Value>, HostError>;

    /// Store `value` under `key`, replacing any previous value.
    fn store_metadata(&mut self, key: &str, value: Value) -> Result<(), HostError>;
}

/// The host's view of a loaded binary.
pub trait BinaryView {
    /// Symbol located exactly at `address`, if any.
    fn symbol_at(&self, address: u64) -> Option<Symbol>;

    /// Functions whose body contains `address`.
    fn functions_containing(&self, address: u64) -> Vec<Function>;

    /// Current cursor address of the active view.
    fn current_offset(&self) -> u64;

    /// Move the active view's cursor. Returns `false` if the host refused.
    fn navigate(&mut self, address: u64) -> bool;
}

/// Single-line text input facility.
pub trait TextPrompt {
    /// Ask the user for a line of text. `None` means the dialog was cancelled.
    fn text_line_input(&mut self, title: &str, prompt: &str) -> Option<String>;
}

/// Semantic color lookup.
pub trait Theme {
    fn color(&self, role: ColorRole) -> Color;
}

/// Opaque identifier of a tab inside a `TabContainer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub usize);

/// Per-view tab widget panels register themselves into.
pub trait TabContainer {
    fn add_tab(&mut self, title: &str) -> TabId;
    fn remove_tab(&mut self, id: TabId) -> bool;
}

/// In-memory metadata store.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadata {
    entries: HashMap<String, Value>,
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to seed a key before handing the store out.
    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
}

impl MetadataStore for MemoryMetadata {
    fn query_metadata(&self, key: &str) -> Result<Option<Value>, HostError> {
        Ok(self.entries.get(key).cloned())
    }

    fn store_metadata(&mut self, key: &str, value: Value) -> Result<(), HostError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Theme with fixed colors per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticTheme {
    pub foreground: Color,
    pub address: Color,
    pub symbol: Color,
}

impl Default for StaticTheme {
    fn default() -> Self {
        Self {
            foreground: Color::rgb(0xe0, 0xe0, 0xe0),
            address: Color::rgb(0xa2, 0xd9, 0xaf),
            symbol: Color::rgb(0x80, 0xc6, 0xe9),
        }
    }
}

impl Theme for StaticTheme {
    fn color(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Foreground => self.foreground,
            ColorRole::Address => self.address,
            ColorRole::Symbol => self.symbol,
        }
    }
}

/// Prompt that always answers with a fixed value, for non-interactive hosts.
#[derive(Debug, Clone, Default)]
pub struct FixedPrompt {
    answer: Option<String>,
}

impl FixedPrompt {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self { answer: Some(answer.into()) }
    }

    pub fn cancelled() -> Self {
        Self { answer: None }
    }
}

impl TextPrompt for FixedPrompt {
    fn text_line_input(&mut self, _title: &str, _prompt: &str) -> Option<String> {
        self.answer.clone()
    }
}
