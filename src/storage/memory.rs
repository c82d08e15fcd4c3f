use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::Storage;
use crate::error::Unavailable;
use crate::models::Paste;

/// Process-local storage, lost on restart.
///
/// The index is behind a read-write lock and every paste has its own mutex, so fetches of
/// different pastes only share the read lock.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pastes: Arc<RwLock<HashMap<String, Arc<Mutex<Paste>>>>>,
}

impl MemoryStorage {
    fn entry(&self, id: &str) -> Option<Arc<Mutex<Paste>>> {
        let pastes = self.pastes.read().unwrap_or_else(PoisonError::into_inner);
        pastes.get(id).cloned()
    }
}

impl Storage for MemoryStorage {
    async fn put_paste(&self, paste: &Paste) -> crate::ApiResult<bool> {
        let mut pastes = self.pastes.write().unwrap_or_else(PoisonError::into_inner);
        match pastes.entry(paste.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(paste.clone())));
                Ok(true)
            }
        }
    }

    async fn consume_paste(&self, id: &str, now: i64) -> crate::ApiResult<Paste> {
        let entry = self.entry(id).ok_or(Unavailable::NotFound)?;
        let mut paste = entry.lock().unwrap_or_else(PoisonError::into_inner);
        paste.check_available(now)?;
        paste.views += 1;
        Ok(paste.clone())
    }

    async fn ping(&self) -> crate::ApiResult<()> {
        Ok(())
    }
}
