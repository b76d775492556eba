use crate::StoreError;
use berth_schema::ContainerId;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared mapping from short name (or alias) to container ID.
///
/// Implementations must make every method an atomic point operation; callers
/// never iterate the index. Binding and searching are separate calls, so two
/// creators can both see a name as free: `bind` is what settles the race.
pub trait NameIndex: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<ContainerId>, StoreError>;

    fn contains(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.get(name)?.is_some())
    }

    /// Bind `name` to `id` only if the name is free. Re-binding a name to the
    /// ID it already points at succeeds; any other holder is a `NameConflict`.
    fn bind(&self, name: &str, id: &ContainerId) -> Result<(), StoreError>;

    /// Unconditionally point `name` at `id`, returning the previous holder.
    fn put(&self, name: &str, id: &ContainerId) -> Result<Option<ContainerId>, StoreError>;

    fn remove(&self, name: &str) -> Result<Option<ContainerId>, StoreError>;
}

/// Process-local [`NameIndex`] guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct MemoryNameIndex {
    names: RwLock<HashMap<String, ContainerId>>,
}

impl MemoryNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, ContainerId)>,
        N: Into<String>,
    {
        let names = entries.into_iter().map(|(n, id)| (n.into(), id)).collect();
        Self {
            names: RwLock::new(names),
        }
    }

    pub fn len(&self) -> usize {
        self.read().map_or(0, |names| names.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ContainerId>>, StoreError> {
        self.names
            .read()
            .map_err(|e| StoreError::IndexPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, ContainerId>>, StoreError> {
        self.names
            .write()
            .map_err(|e| StoreError::IndexPoisoned(e.to_string()))
    }
}

impl NameIndex for MemoryNameIndex {
    fn get(&self, name: &str) -> Result<Option<ContainerId>, StoreError> {
        Ok(self.read()?.get(name).cloned())
    }

    fn bind(&self, name: &str, id: &ContainerId) -> Result<(), StoreError> {
        let mut names = self.write()?;
        match names.get(name) {
            Some(existing) if existing == id => Ok(()),
            Some(existing) => Err(StoreError::NameConflict {
                name: name.to_owned(),
                existing_id: existing.to_string(),
            }),
            None => {
                names.insert(name.to_owned(), id.clone());
                Ok(())
            }
        }
    }

    fn put(&self, name: &str, id: &ContainerId) -> Result<Option<ContainerId>, StoreError> {
        Ok(self.write()?.insert(name.to_owned(), id.clone()))
    }

    fn remove(&self, name: &str) -> Result<Option<ContainerId>, StoreError> {
        Ok(self.write()?.remove(name))
    }
}
