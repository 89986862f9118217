//! Shared test utilities.

#![allow(dead_code)]

use immutable_flux::{
    create_immutable_store, Dispatcher, PersistentValue, PropMap, RecordingSink, StoreFactory,
    StoreSpec,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary settings file with the given TOML content.
pub fn temp_settings(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("settings.toml");
    std::fs::write(&path, content).expect("Failed to write settings");
    (temp_dir, path)
}

/// A sink that records every warning.
pub fn recording_sink() -> Arc<RecordingSink> {
    RecordingSink::new()
}

/// A store holding a list of items, handling `ADD_ITEM` and `RESET_ITEMS`.
pub fn items_store() -> StoreFactory {
    create_immutable_store(
        StoreSpec::new("ItemStore")
            .initialize(|store| {
                store.set_state(PersistentValue::empty_map().set("items", PersistentValue::list(Vec::<PersistentValue>::new())));
            })
            .handler("ADD_ITEM", |store, payload| {
                let items = match store.get_state().get("items") {
                    Some(PersistentValue::List(items)) => {
                        let mut items = items.clone();
                        items.push_back(PersistentValue::from(payload));
                        items
                    }
                    _ => im::Vector::unit(PersistentValue::from(payload)),
                };
                store.merge_state(PersistentValue::empty_map().set("items", PersistentValue::List(items)));
            })
            .handler("RESET_ITEMS", |store, _| {
                store.merge_state(PersistentValue::empty_map().set("items", PersistentValue::list(Vec::<PersistentValue>::new())));
            }),
    )
}

/// A store with a single `user` entry, handling `SET_USER`.
pub fn user_store() -> StoreFactory {
    create_immutable_store(StoreSpec::new("UserStore").handler("SET_USER", |store, payload| {
        store.merge_state(PersistentValue::empty_map().set("user", payload));
    }))
}

/// A dispatcher with both sample stores registered.
pub fn sample_dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_store(items_store());
    dispatcher.register_store(user_store());
    dispatcher
}

/// Props built from plain JSON pairs.
pub fn plain_props(entries: &[(&str, Value)]) -> PropMap {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
