//! Browser storage and environment helpers for the app shell.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::window;
use js_sys::Date;

use crate::core::config::ClientConfig;
use crate::core::error::StorageError;
use crate::core::storage::KeyValueStore;

/// `KeyValueStore` over `window.localStorage`, storing raw strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct LocalStorageStore;

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &'static str) -> Option<String> {
        match LocalStorage::raw().get_item(key) {
            Ok(value) => value,
            Err(err) => {
                log_storage_error("get", key, &format!("{err:?}"));
                None
            }
        }
    }

    fn set(&self, key: &'static str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw().set_item(key, value).map_err(|err| {
            let detail = format!("{err:?}");
            log_storage_error("set", key, &detail);
            StorageError::Write { key, detail }
        })
    }

    fn remove(&self, key: &'static str) {
        if let Err(err) = LocalStorage::raw().remove_item(key) {
            log_storage_error("remove", key, &format!("{err:?}"));
        }
    }
}

/// REST settings for the current page location.
pub(crate) fn client_config() -> ClientConfig {
    let location = window().location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let host = location.hostname().unwrap_or_default();
    let port = location.port().unwrap_or_default();
    ClientConfig::from_location(&protocol, &host, &port)
}

/// Wall-clock milliseconds, as `exp` checks expect.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn now_ms() -> i64 {
    Date::now() as i64
}

fn log_storage_error(operation: &'static str, key: &'static str, detail: &str) {
    console::error!("storage operation failed", operation, key, detail);
}
