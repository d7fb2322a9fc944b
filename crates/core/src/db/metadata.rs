use serde_json::Value;

use crate::db::ProjectDb;
use crate::host::{HostError, MetadataStore};

/// `MetadataStore` over one binary's rows in a `ProjectDb`.
#[derive(Debug, Clone, Copy)]
pub struct ScopedMetadata<'db> {
    db: &'db ProjectDb,
    binary: &'db str,
}

impl<'db> ScopedMetadata<'db> {
    pub fn new(db: &'db ProjectDb, binary: &'db str) -> Self {
        Self { db, binary }
    }

    pub fn binary(&self) -> &str {
        self.binary
    }
}

impl MetadataStore for ScopedMetadata<'_> {
    fn query_metadata(&self, key: &str) -> Result<Option<Value>, HostError> {
        self.db.query_metadata(self.binary, key).map_err(|e| HostError::Metadata(e.to_string()))
    }

    fn store_metadata(&mut self, key: &str, value: Value) -> Result<(), HostError> {
        self.db
            .store_metadata(self.binary, key, &value)
            .map_err(|e| HostError::Metadata(e.to_string()))
    }
}
