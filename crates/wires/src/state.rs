use std::{any::Any, collections::HashMap};

/// Per-panel key/value store holding everything the shared wire actions need
/// to remember about one entity.
///
/// Values are opaque to the store. Every typed read fails closed: asking for
/// the wrong type behaves exactly like asking for a missing key.
#[derive(Default)]
pub struct StateStore {
    entries: HashMap<String, Box<dyn Any + Send>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)?.downcast_mut::<T>()
    }

    pub fn get_copied<T: Any + Copy>(&self, key: &str) -> Option<T> {
        self.get::<T>(key).copied()
    }

    pub fn set<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes `key` only if it currently holds a `T`.
    pub fn take<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key)?.is::<T>() {
            return None;
        }
        let boxed = self.entries.remove(key)?;
        boxed.downcast::<T>().ok().map(|value| *value)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("StateStore").field("keys", &keys).finish()
    }
}

/// Builds the `scope:name` key a wire action uses for its per-entity data.
pub fn scoped_key(scope: &str, name: &str) -> String {
    format!("{scope}:{name}")
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
