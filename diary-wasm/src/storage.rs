use diary_client::session::{KeyValueStore, Session, SessionSlot, SessionStore};
use gloo_storage::{LocalStorage, Storage};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("browser storage error: {0}")]
pub struct StorageError(String);

/// Raw `localStorage` strings, so tokens are stored without JSON quoting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserStore;

impl KeyValueStore for BrowserStore {
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| StorageError(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| StorageError(format!("{:?}", e)))
    }
}

pub fn sessions() -> SessionStore<BrowserStore> {
    SessionStore::new(BrowserStore)
}

pub fn load_session(slot: SessionSlot) -> Option<Session> {
    match sessions().load(slot) {
        Ok(session) => session,
        Err(e) => {
            log::warn!("Failed to read session: {}", e);
            None
        }
    }
}

pub fn save_session(slot: SessionSlot, session: &Session) {
    if let Err(e) = sessions().save(slot, session) {
        log::error!("Failed to save session: {}", e);
    }
}

pub fn clear_session(slot: SessionSlot) {
    if let Err(e) = sessions().clear(slot) {
        log::error!("Failed to clear session: {}", e);
    }
}

pub fn token(slot: SessionSlot) -> Option<String> {
    BrowserStore
        .get(slot.token_key())
        .ok()
        .flatten()
        .filter(|t| !t.trim().is_empty())
}
