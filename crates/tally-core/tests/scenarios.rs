//! End-to-end scenarios for the item store and its persisted mirror.

use tally_core::persist::{DEFAULT_KEY, MemoryStorage, PersistenceAdapter};
use tally_core::{ErrorCode, Item, ItemId, ItemStore, KeyValueStore, Session, StoreError};

// ---------------------------------------------------------------------------
// Store-level scenarios
// ---------------------------------------------------------------------------

#[test]
fn adding_n_items_yields_sequential_ids_and_summed_total() {
    let mut store = ItemStore::new();
    let values = [300, 150, 0, -20, 75];
    for (i, v) in values.iter().enumerate() {
        let item = store.add(&format!("item {i}"), &v.to_string()).unwrap();
        assert_eq!(item.id, ItemId(i as u64));
    }
    let ids: Vec<ItemId> = store.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, (0..5).map(ItemId).collect::<Vec<_>>());
    assert_eq!(store.total_value(), values.iter().sum::<i64>());
}

#[test]
fn eggs_and_toast_walkthrough() {
    let mut store = ItemStore::new();

    let eggs = store.add("Eggs", "300").unwrap().clone();
    assert_eq!(eggs, Item::new(ItemId(0), "Eggs", 300));
    assert_eq!(store.total_value(), 300);

    let toast = store.add("Toast", "150").unwrap().clone();
    assert_eq!(toast.id, ItemId(1));
    assert_eq!(store.total_value(), 450);

    store.set_selected(Some(eggs.id));
    store.update("Eggs", "400").unwrap();
    assert_eq!(store.find_by_id(ItemId(0)).map(|i| i.value), Some(400));
    assert_eq!(store.total_value(), 550);

    store.remove(ItemId(1));
    assert_eq!(store.total_value(), 400);
    assert!(store.find_by_id(ItemId(1)).is_none());
}

#[test]
fn update_before_any_selection_fails_without_change() {
    let mut store = ItemStore::new();
    store.add("Eggs", "300").unwrap();
    let before = store.items().to_vec();

    let err = store.update("Eggs", "999").unwrap_err();
    assert_eq!(err, StoreError::NoSelection);
    assert_eq!(err.code(), ErrorCode::NoSelection);
    assert_eq!(store.items(), before.as_slice());
}

#[test]
fn clear_all_resets_total_and_ids() {
    let mut store = ItemStore::new();
    store.add("Eggs", "300").unwrap();
    store.add("Toast", "150").unwrap();

    store.clear_all();
    assert_eq!(store.total_value(), 0);
    assert_eq!(store.add("Jam", "80").unwrap().id, ItemId(0));
}

// ---------------------------------------------------------------------------
// Session scenarios (store + persistence in lockstep)
// ---------------------------------------------------------------------------

fn open(storage: MemoryStorage) -> Session<MemoryStorage> {
    Session::open(PersistenceAdapter::new(storage)).expect("open session")
}

#[test]
fn load_without_stored_key_is_empty() {
    let adapter = PersistenceAdapter::new(MemoryStorage::new());
    assert_eq!(adapter.load().unwrap(), Vec::<Item>::new());
    assert!(open(MemoryStorage::new()).items().is_empty());
}

#[test]
fn session_walkthrough_keeps_slot_in_sync() {
    let mut session = open(MemoryStorage::new());

    assert_eq!(session.add("Eggs", "300").unwrap().total, 300);
    assert_eq!(session.add("Toast", "150").unwrap().total, 450);

    session.begin_edit(ItemId(0)).unwrap();
    assert_eq!(session.update("Eggs", "400").unwrap().total, 550);

    session.begin_edit(ItemId(1)).unwrap();
    assert_eq!(session.delete_selected().unwrap().total, 400);

    let stored = session.persistence().load().unwrap();
    assert_eq!(stored, session.items());
    assert_eq!(stored, vec![Item::new(ItemId(0), "Eggs", 400)]);
}

#[test]
fn state_survives_restart() {
    let mut session = open(MemoryStorage::new());
    session.add("Eggs", "300").unwrap();
    session.add("Toast", "150").unwrap();
    session.remove(ItemId(0)).unwrap();

    let (_, adapter) = session.into_parts();
    let mut restarted = open(adapter.into_storage());
    assert_eq!(restarted.items(), &[Item::new(ItemId(1), "Toast", 150)]);
    assert_eq!(restarted.total(), 150);
    assert!(restarted.selected().is_none());

    assert_eq!(restarted.add("Jam", "80").unwrap().item.map(|i| i.id), Some(ItemId(2)));
}

#[test]
fn legacy_calories_snapshot_loads() {
    let mut storage = MemoryStorage::new();
    storage
        .set(
            DEFAULT_KEY,
            r#"[{"id":0,"name":"Stake Dinner","calories":1200},{"id":1,"name":"Cookie","calories":400}]"#,
        )
        .unwrap();

    let mut session = open(storage);
    assert_eq!(session.total(), 1600);

    session.begin_edit(ItemId(1)).unwrap();
    session.update("Cookie", "350").unwrap();
    let raw = session.persistence().storage().get(DEFAULT_KEY).unwrap().unwrap();
    assert!(raw.contains(r#""value":350"#), "{raw}");
}

#[test]
fn clear_all_then_restart_is_empty() {
    let mut session = open(MemoryStorage::new());
    session.add("Eggs", "300").unwrap();
    session.clear_all().unwrap();

    let (_, adapter) = session.into_parts();
    assert!(adapter.storage().get(DEFAULT_KEY).unwrap().is_none());
    assert_eq!(open(adapter.into_storage()).total(), 0);
}
