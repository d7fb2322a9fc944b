use bookmark_core::host::{MemoryMetadata, MetadataStore};
use bookmark_core::model::Bookmark;
use bookmark_core::store::{BookmarkError, BookmarkStore, METADATA_KEY};
use proptest::prelude::*;
use serde_json::json;

fn addresses<M>(store: &BookmarkStore<M>) -> Vec<u64> {
    store.iter().map(|b| b.address).collect()
}

#[test]
fn inserts_keep_the_list_sorted() {
    let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
    for (address, label) in [(0x30, "c"), (0x10, "a"), (0x50, "e"), (0x20, "b"), (0x40, "d")] {
        store.insert(address, label).unwrap();
        let addrs = addresses(&store);
        assert!(addrs.windows(2).all(|w| w[0] <= w[1]), "unsorted: {addrs:x?}");
    }
    assert_eq!(addresses(&store), vec![0x10, 0x20, 0x30, 0x40, 0x50]);
}

#[test]
fn later_insert_at_lower_address_lands_first() {
    let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
    store.insert(0x1000, "main").unwrap();
    assert_eq!(store.insert(0x500, "init").unwrap(), 0);

    assert_eq!(
        store.bookmarks(),
        &[Bookmark::new(0x500, "init"), Bookmark::new(0x1000, "main")][..]
    );
    assert_eq!(
        store.metadata().get(METADATA_KEY),
        Some(&json!({"1280": "init", "4096": "main"}))
    );
}

#[test]
fn duplicate_addresses_keep_insertion_order() {
    let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
    store.insert(0x10, "A").unwrap();
    let row = store.insert(0x10, "B").unwrap();
    assert_eq!(row, 1);
    assert_eq!(store.get(0).map(|b| b.label.as_str()), Some("A"));
    assert_eq!(store.get(1).map(|b| b.label.as_str()), Some("B"));

    // Both labels survive a reload.
    let reloaded = BookmarkStore::load(store.into_metadata()).unwrap();
    let labels: Vec<&str> = reloaded.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "B"]);
}

#[test]
fn persisted_list_round_trips_through_metadata() {
    let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
    store.insert(0x401000, "entry").unwrap();
    store.insert(0x402abc, "decrypt loop").unwrap();
    store.insert(0x400000, "header").unwrap();
    let expected = store.bookmarks().to_vec();

    let reloaded = BookmarkStore::load(store.into_metadata()).unwrap();
    assert_eq!(reloaded.bookmarks(), expected.as_slice());
}

#[test]
fn rename_changes_only_the_label() {
    let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
    store.insert(0x10, "a").unwrap();
    store.insert(0x20, "b").unwrap();

    store.rename(1, "renamed").unwrap();
    assert_eq!(store.bookmarks(), &[Bookmark::new(0x10, "a"), Bookmark::new(0x20, "renamed")][..]);
    assert_eq!(
        store.metadata().get(METADATA_KEY),
        Some(&json!({"16": "a", "32": "renamed"}))
    );
}

#[test]
fn remove_deletes_exactly_one_row() {
    let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
    store.insert(0x10, "a").unwrap();
    store.insert(0x20, "b").unwrap();
    store.insert(0x30, "c").unwrap();

    let removed = store.remove(1).unwrap();
    assert_eq!(removed, Bookmark::new(0x20, "b"));
    assert_eq!(addresses(&store), vec![0x10, 0x30]);
    assert_eq!(store.metadata().get(METADATA_KEY), Some(&json!({"16": "a", "48": "c"})));

    store.remove(0).unwrap();
    store.remove(0).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.metadata().get(METADATA_KEY), Some(&json!({})));
}

#[test]
fn missing_key_loads_empty() {
    let store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
    assert!(store.is_empty());
    // Loading alone never writes.
    assert!(store.metadata().query_metadata(METADATA_KEY).unwrap().is_none());
}

#[test]
fn load_sorts_persisted_entries_numerically() {
    let metadata = MemoryMetadata::new()
        .with_entry(METADATA_KEY, json!({"256": "late", "16": "early", "4096": ["x", "y"]}));
    let store = BookmarkStore::load(metadata).unwrap();
    assert_eq!(
        store.bookmarks(),
        &[
            Bookmark::new(16, "early"),
            Bookmark::new(256, "late"),
            Bookmark::new(4096, "x"),
            Bookmark::new(4096, "y"),
        ][..]
    );
}

#[test]
fn malformed_metadata_is_rejected() {
    for bad in [json!(["a"]), json!({"0x10": "hex"}), json!({"16": 5}), json!({"16": [1]})] {
        let metadata = MemoryMetadata::new().with_entry(METADATA_KEY, bad.clone());
        let err = BookmarkStore::load(metadata).unwrap_err();
        assert!(matches!(err, BookmarkError::Malformed(_)), "accepted {bad}");
    }
}

#[test]
fn reload_rereads_metadata_and_signals_reset() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use bookmark_core::store::BookmarkEvent;

    let metadata = MemoryMetadata::new().with_entry(METADATA_KEY, json!({"1": "one"}));
    let mut store = BookmarkStore::load(metadata).unwrap();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |e| sink.borrow_mut().push(*e));

    store.reload().unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(*events.borrow(), vec![BookmarkEvent::Reset]);
}

proptest! {
    #[test]
    fn any_insert_sequence_stays_sorted_and_round_trips(
        entries in prop::collection::vec((0u64..48, "[a-z]{1,6}"), 0..40)
    ) {
        let mut store = BookmarkStore::load(MemoryMetadata::new()).unwrap();
        for (address, label) in &entries {
            let row = store.insert(*address, label.as_str()).unwrap();
            let bookmarks = store.bookmarks();
            prop_assert_eq!(&bookmarks[row], &Bookmark::new(*address, label.as_str()));
            prop_assert!(bookmarks[..row].iter().all(|b| b.address <= *address));
            prop_assert!(bookmarks[row + 1..].iter().all(|b| b.address > *address));
        }

        // Equal addresses keep insertion order.
        let mut expected: Vec<Bookmark> =
            entries.iter().map(|(a, l)| Bookmark::new(*a, l.as_str())).collect();
        expected.sort_by_key(|b| b.address);
        prop_assert_eq!(store.bookmarks(), expected.as_slice());

        let reloaded = BookmarkStore::load(store.into_metadata()).unwrap();
        prop_assert_eq!(reloaded.bookmarks(), expected.as_slice());
    }
}
