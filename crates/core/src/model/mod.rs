//! Core value types shared by the store, the panel, and host adapters.
//!
//! - `Bookmark`: a labeled address inside one loaded binary.
//! - `Symbol` / `Function`: what the host reports about an address.
//! - `Color` / `ColorRole`: semantic display colors resolved through the theme.

use serde::{Deserialize, Serialize};

/// A labeled address of interest within a loaded binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub address: u64,
    pub label: String,
}

impl Bookmark {
    pub fn new(address: u64, label: impl Into<String>) -> Self {
        Self { address, label: label.into() }
    }
}

/// Broad classification of a symbol as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Data,
    Other,
}

/// A named location resolved by the host's analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Short (display) name, e.g. without a leading underscore or namespace.
    pub short_name: String,
    pub address: u64,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(short_name: impl Into<String>, address: u64, kind: SymbolKind) -> Self {
        Self { short_name: short_name.into(), address, kind }
    }
}

/// A function known to contain some address.
///
/// `start` is the address of the function's symbol; it is usually, but not
/// always, below the queried address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub start: u64,
    pub symbol: Symbol,
}

impl Function {
    pub fn new(symbol: Symbol) -> Self {
        Self { start: symbol.address, symbol }
    }
}

/// Packed `0xAARRGGBB` color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn rgba(self) -> u32 {
        self.0
    }

    /// Parse `#RRGGBB` or `#AARRGGBB`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#')?;
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self(0xFF00_0000 | value)),
            8 => Some(Self(value)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:08x}", self.0)
    }
}

/// Semantic color slots used when rendering bookmark rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    /// Regular text (taken from the widget palette in a GUI host).
    Foreground,
    Address,
    Symbol,
}
