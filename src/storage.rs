use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use web_sys::{window, Storage};

use crate::error::{Error, Result, js_message};


/// String keyed storage provided by the host.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<'a, A> Store for &'a A where A: Store + ?Sized {
    #[inline]
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    #[inline]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}


/// The browser's `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn new() -> Result<Self> {
        let window = window().ok_or(Error::NoWindow)?;

        let storage = window.local_storage()
            .map_err(|e| Error::StorageUnavailable(js_message(&e)))?
            .ok_or_else(|| Error::StorageUnavailable("`window.localStorage` is null".to_owned()))?;

        Ok(Self { storage })
    }
}

impl Store for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(|e| Error::StorageRead {
            key: key.to_owned(),
            message: js_message(&e),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(|e| Error::StorageWrite {
            key: key.to_owned(),
            message: js_message(&e),
        })
    }
}


/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry<K, V>(self, key: K, value: V) -> Self where K: Into<String>, V: Into<String> {
        self.entries.borrow_mut().insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
