use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::host::StaticTheme;
use crate::model::Color;
use crate::panel::DEFAULT_ADDRESS_WIDTH;

/// Database location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the project database file (typically relative to project root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Display colors as `#RRGGBB` / `#AARRGGBB` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub foreground: String,
    pub address: String,
    pub symbol: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let theme = StaticTheme::default();
        Self {
            foreground: theme.foreground.to_hex(),
            address: theme.address.to_hex(),
            symbol: theme.symbol.to_hex(),
        }
    }
}

impl ThemeConfig {
    /// Resolve the configured colors, falling back to defaults for entries
    /// that do not parse.
    pub fn to_theme(&self) -> StaticTheme {
        let defaults = StaticTheme::default();
        StaticTheme {
            foreground: parse_or(&self.foreground, defaults.foreground, "foreground"),
            address: parse_or(&self.address, defaults.address, "address"),
            symbol: parse_or(&self.symbol, defaults.symbol, "symbol"),
        }
    }
}

fn parse_or(text: &str, fallback: Color, role: &str) -> Color {
    Color::parse_hex(text).unwrap_or_else(|| {
        warn!(role, value = text, "ignoring invalid theme color");
        fallback
    })
}

fn default_address_width() -> usize {
    DEFAULT_ADDRESS_WIDTH
}

/// Serializable configuration describing a bookmarks project.
///
/// This lives at `.bookmarks/project.json` in the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format, not binary version.
    pub config_version: String,
    /// Database configuration (path is typically relative to project root).
    pub db: DbConfig,
    /// Colors used when rendering bookmark rows.
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Width of the zero-padded hexadecimal address column.
    #[serde(default = "default_address_width")]
    pub address_width: usize,
}

impl ProjectConfig {
    /// Create a new project configuration using the given name and db path.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            theme: ThemeConfig::default(),
            address_width: DEFAULT_ADDRESS_WIDTH,
        }
    }
}
