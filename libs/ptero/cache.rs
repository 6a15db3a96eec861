//! Cache-as-you-go entity maps
//!
//! Plain ID → value maps filled from API responses. There is no TTL or
//! eviction; entries leave only through an explicit delete. Concurrent
//! writers to the same key race and the last write wins.

use dashmap::DashMap;
use tracing::debug;

use crate::application::types::{Allocation, AppServer, Node, User};

/// Something that can be stored in an [`EntityCache`]
pub trait Identified {
    fn id(&self) -> i64;
}

#[derive(Debug)]
pub struct EntityCache<V> {
    name: &'static str,
    entries: DashMap<i64, V>,
}

impl<V: Clone + Identified> EntityCache<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, id: i64) -> Option<V> {
        let hit = self.entries.get(&id).map(|v| v.value().clone());
        if hit.is_some() {
            debug!("{} cache hit for {}", self.name, id);
        }
        hit
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn insert(&self, value: V) {
        self.entries.insert(value.id(), value);
    }

    pub fn insert_many<'a, I>(&self, values: I)
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        for v in values {
            self.insert(v.clone());
        }
    }

    pub fn remove(&self, id: i64) -> Option<V> {
        self.entries.remove(&id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Per-entity caches for the application API
#[derive(Debug)]
pub struct ApplicationCache {
    pub users: EntityCache<User>,
    pub servers: EntityCache<AppServer>,
    pub nodes: EntityCache<Node>,
    pub allocations: EntityCache<Allocation>,
}

impl ApplicationCache {
    pub fn new() -> Self {
        Self {
            users: EntityCache::new("users"),
            servers: EntityCache::new("servers"),
            nodes: EntityCache::new("nodes"),
            allocations: EntityCache::new("allocations"),
        }
    }
}

impl Default for ApplicationCache {
    fn default() -> Self {
        Self::new()
    }
}
