use serde::{Deserialize, Serialize};

/// Record describing a binary known to the project.
///
/// The name doubles as the scope key for that binary's metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BinaryRecord {
    /// Human-friendly name (e.g., "libExampleGame.so (armv7)").
    pub name: String,
    /// Path to the binary, relative to the project root if possible.
    pub path: String,
    /// Optional architecture string (e.g., "armv7", "x86_64").
    pub arch: Option<String>,
    /// Optional content hash for identity (e.g., SHA-256).
    pub hash: Option<String>,
}

impl BinaryRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { name: name.into(), path: path.into(), arch: None, hash: None }
    }
}

/// One stored metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    pub binary: String,
    pub key: String,
    pub value: serde_json::Value,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}
