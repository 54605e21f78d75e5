//! The shared set of active sessions, keyed by nickname.
//!
//! Uniqueness is case-insensitive (keys are lowercased); display nicknames
//! keep the case claimed at handshake. Mutations take the write lock, so a
//! snapshot never observes a partially inserted or removed entry; concurrent
//! snapshots share the read lock and do not block each other. Nothing holds
//! either lock across an await point.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::RegistryError;

use super::session::Session;

#[derive(Debug, Default)]
pub struct Registry {
    inner: RwLock<HashMap<String, Arc<Session>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under its nickname. Collisions are reported, never
    /// overwritten.
    pub fn add(&self, session: Arc<Session>) -> Result<(), RegistryError> {
        let key = session.nickname().to_lowercase();
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&key) {
            return Err(RegistryError::DuplicateIdentity);
        }
        map.insert(key, session);
        Ok(())
    }

    /// Deregister a nickname, returning the session it mapped to.
    pub fn remove(&self, nickname: &str) -> Result<Arc<Session>, RegistryError> {
        let key = nickname.to_lowercase();
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(&key).ok_or(RegistryError::NotFound)
    }

    pub fn lookup(&self, nickname: &str) -> Option<Arc<Session>> {
        let key = nickname.to_lowercase();
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&key).cloned()
    }

    /// Point-in-time consistent view of all registered sessions, ordered by
    /// key so iteration is stable across calls.
    pub fn snapshot(&self) -> Vec<(String, Arc<Session>)> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = map
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        drop(map);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Sorted display nicknames of all registered sessions.
    pub fn nicknames(&self) -> Vec<String> {
        let mut nicks: Vec<String> = {
            let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            map.values().map(|s| s.nickname().to_string()).collect()
        };
        nicks.sort();
        nicks
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
