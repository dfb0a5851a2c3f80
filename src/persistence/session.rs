use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{HIGH_SCORE_KEY, HighScoreStore};

/// Process-scoped string key/value storage.
///
/// Clones share the same slots, so every game started in this process sees
/// what earlier games wrote. Nothing touches the disk.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: String) {
        self.items.borrow_mut().insert(key.to_string(), value);
    }

    pub fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// High-score store backed by [`SessionStorage`]
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: SessionStorage,
    key: String,
}

impl SessionStore {
    pub fn new(storage: SessionStorage) -> Self {
        Self::with_key(storage, HIGH_SCORE_KEY)
    }

    pub fn with_key(storage: SessionStorage, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionStorage::new())
    }
}

impl HighScoreStore for SessionStore {
    fn load(&self) -> Result<u32> {
        match self.storage.get_item(&self.key) {
            Some(raw) => parse_leading_number(&raw),
            None => Ok(0),
        }
    }

    fn save(&mut self, value: u32) -> Result<()> {
        self.storage.set_item(&self.key, value.to_string());
        Ok(())
    }
}

/// Read the run of digits at the start of `raw`, ignoring whatever follows,
/// so `"12abc"` is 12. No leading digits is an error.
fn parse_leading_number(raw: &str) -> Result<u32> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end]
        .parse()
        .with_context(|| format!("Stored high score is not a number: {:?}", raw))
}
