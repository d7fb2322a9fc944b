//! The bookmark list for one loaded binary.
//!
//! `BookmarkStore` owns the canonical in-memory list, keeps it sorted by
//! address, and rewrites the whole list into the binary's metadata after every
//! mutation. Observers registered with `subscribe` are told about each change
//! so a view can refresh.
//!
//! A mutation whose persist fails is undone in memory before the error is
//! returned, and observers receive the inverse event, so the list always
//! matches what was last written.

pub mod codec;

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::host::{HostError, MetadataStore};
use crate::model::Bookmark;

pub use codec::METADATA_KEY;

/// Error type for bookmark store operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// A row index did not name an existing bookmark.
    #[error("row {row} is out of range ({len} bookmarks)")]
    RowOutOfRange { row: usize, len: usize },

    /// The persisted `bookmarks` value could not be understood.
    #[error("malformed bookmarks metadata: {0}")]
    Malformed(String),

    /// The host's metadata store failed.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Convenience result type for store operations.
pub type BookmarkResult<T> = Result<T, BookmarkError>;

/// Change notification delivered to observers after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkEvent {
    /// The whole list was replaced (initial load).
    Reset,
    Inserted { row: usize },
    Renamed { row: usize },
    Removed { row: usize },
}

type Observer = Box<dyn FnMut(&BookmarkEvent)>;

/// Sorted bookmark list bound to a metadata store.
pub struct BookmarkStore<M> {
    metadata: M,
    bookmarks: Vec<Bookmark>,
    observers: Vec<Observer>,
}

impl<M: MetadataStore> BookmarkStore<M> {
    /// Load the list from `metadata`. A missing `bookmarks` key yields an empty list.
    pub fn load(metadata: M) -> BookmarkResult<Self> {
        let bookmarks = match metadata.query_metadata(METADATA_KEY)? {
            Some(value) => codec::decode(&value)?,
            None => Vec::new(),
        };
        debug!(count = bookmarks.len(), "loaded bookmarks");
        Ok(Self { metadata, bookmarks, observers: Vec::new() })
    }

    /// Re-read the persisted list, discarding the in-memory one.
    pub fn reload(&mut self) -> BookmarkResult<()> {
        self.bookmarks = match self.metadata.query_metadata(METADATA_KEY)? {
            Some(value) => codec::decode(&value)?,
            None => Vec::new(),
        };
        self.notify(BookmarkEvent::Reset);
        Ok(())
    }

    /// Insert a bookmark after every existing entry with an address `<= address`.
    ///
    /// Returns the row the bookmark landed on.
    pub fn insert(&mut self, address: u64, label: impl Into<String>) -> BookmarkResult<usize> {
        let row = self.bookmarks.partition_point(|b| b.address <= address);
        self.bookmarks.insert(row, Bookmark::new(address, label));
        debug!(row, address, "inserted bookmark");
        self.notify(BookmarkEvent::Inserted { row });
        if let Err(err) = self.persist() {
            self.bookmarks.remove(row);
            self.notify(BookmarkEvent::Removed { row });
            return Err(err);
        }
        Ok(row)
    }

    /// Replace the label of the bookmark at `row`.
    pub fn rename(&mut self, row: usize, label: impl Into<String>) -> BookmarkResult<()> {
        let len = self.bookmarks.len();
        let bookmark =
            self.bookmarks.get_mut(row).ok_or(BookmarkError::RowOutOfRange { row, len })?;
        let previous = std::mem::replace(&mut bookmark.label, label.into());
        debug!(row, "renamed bookmark");
        self.notify(BookmarkEvent::Renamed { row });
        if let Err(err) = self.persist() {
            self.bookmarks[row].label = previous;
            self.notify(BookmarkEvent::Renamed { row });
            return Err(err);
        }
        Ok(())
    }

    /// Delete the bookmark at `row` and return it.
    pub fn remove(&mut self, row: usize) -> BookmarkResult<Bookmark> {
        let len = self.bookmarks.len();
        if row >= len {
            return Err(BookmarkError::RowOutOfRange { row, len });
        }
        let removed = self.bookmarks.remove(row);
        debug!(row, address = removed.address, "removed bookmark");
        self.notify(BookmarkEvent::Removed { row });
        if let Err(err) = self.persist() {
            self.bookmarks.insert(row, removed);
            self.notify(BookmarkEvent::Inserted { row });
            return Err(err);
        }
        Ok(removed)
    }

    /// Overwrite the persisted list with the current in-memory list.
    pub fn persist(&mut self) -> BookmarkResult<()> {
        let value = codec::encode(&self.bookmarks);
        if let Err(err) = self.metadata.store_metadata(METADATA_KEY, value) {
            warn!(error = %err, "failed to persist bookmarks");
            return Err(err.into());
        }
        Ok(())
    }
}

impl<M> BookmarkStore<M> {
    /// Register a callback invoked after every mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&BookmarkEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Bookmark> {
        self.bookmarks.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bookmark> {
        self.bookmarks.iter()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn into_metadata(self) -> M {
        self.metadata
    }

    fn notify(&mut self, event: BookmarkEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

impl<M> fmt::Debug for BookmarkStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkStore")
            .field("bookmarks", &self.bookmarks)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<'a, M> IntoIterator for &'a BookmarkStore<M> {
    type Item = &'a Bookmark;
    type IntoIter = std::slice::Iter<'a, Bookmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.bookmarks.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::host::MemoryMetadata;

    #[test]
    fn insert_finds_upper_bound() {
        let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
        assert_eq!(store.insert(0x20, "b").unwrap(), 0);
        assert_eq!(store.insert(0x10, "a").unwrap(), 0);
        assert_eq!(store.insert(0x20, "b2").unwrap(), 2);
        assert_eq!(store.insert(0x30, "c").unwrap(), 3);
    }

    #[test]
    fn observers_see_each_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
        let sink = Rc::clone(&seen);
        store.subscribe(move |event| sink.borrow_mut().push(*event));

        store.insert(1, "x").unwrap();
        store.rename(0, "y").unwrap();
        store.remove(0).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                BookmarkEvent::Inserted { row: 0 },
                BookmarkEvent::Renamed { row: 0 },
                BookmarkEvent::Removed { row: 0 },
            ]
        );
    }

    struct ReadOnly(MemoryMetadata);

    impl MetadataStore for ReadOnly {
        fn query_metadata(&self, key: &str) -> Result<Option<serde_json::Value>, HostError> {
            self.0.query_metadata(key)
        }

        fn store_metadata(&mut self, _: &str, _: serde_json::Value) -> Result<(), HostError> {
            Err(HostError::Metadata("read-only".into()))
        }
    }

    #[test]
    fn failed_persist_is_rolled_back() {
        let seeded = MemoryMetadata::new().with_entry(METADATA_KEY, serde_json::json!({"16": "a"}));
        let mut store = BookmarkStore::load(ReadOnly(seeded)).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |event| sink.borrow_mut().push(*event));

        assert!(store.insert(0x8, "b").is_err());
        assert!(store.rename(0, "renamed").is_err());
        assert!(store.remove(0).is_err());

        assert_eq!(store.bookmarks(), &[Bookmark::new(16, "a")][..]);
        assert_eq!(
            *seen.borrow(),
            vec![
                BookmarkEvent::Inserted { row: 0 },
                BookmarkEvent::Removed { row: 0 },
                BookmarkEvent::Renamed { row: 0 },
                BookmarkEvent::Renamed { row: 0 },
                BookmarkEvent::Removed { row: 0 },
                BookmarkEvent::Inserted { row: 0 },
            ]
        );
    }

    #[test]
    fn out_of_range_rows_are_rejected() {
        let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
        assert!(matches!(
            store.rename(0, "nope"),
            Err(BookmarkError::RowOutOfRange { row: 0, len: 0 })
        ));
        assert!(matches!(store.remove(3), Err(BookmarkError::RowOutOfRange { row: 3, len: 0 })));
    }
}
