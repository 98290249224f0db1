use crate::shared::analysis::error::StoreError;
use crate::shared::analysis::layout::LayoutStore;

/// `window.localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

fn storage() -> Result<web_sys::Storage, StoreError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(StoreError::Unavailable)
}

impl LayoutStore for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        storage()?.get_item(key).map_err(|_| StoreError::Unavailable)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Write(format!("{:?}", e)))
    }
}
