use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::{LazyLock, RwLock}
};

use crate::schema::Schema;

/// Global schema cache
static SCHEMA_CACHE: LazyLock<RwLock<SchemaCache>> =
    LazyLock::new(|| RwLock::new(SchemaCache::new(64)));

/// Cache of parsed schemas keyed by DDL text
pub struct SchemaCache {
    cache:    HashMap<u64, Schema>,
    max_size: usize
}

impl SchemaCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::with_capacity(max_size),
            max_size
        }
    }

    fn hash_key(ddl: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        ddl.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, ddl: &str) -> Option<Schema> {
        let key = Self::hash_key(ddl);
        self.cache.get(&key).cloned()
    }

    pub fn insert(&mut self, ddl: &str, schema: Schema) {
        // Simple eviction: clear half when full
        if self.cache.len() >= self.max_size {
            let keys: Vec<_> = self.cache.keys().take(self.max_size / 2).copied().collect();
            for key in keys {
                self.cache.remove(&key);
            }
        }

        let key = Self::hash_key(ddl);
        self.cache.insert(key, schema);
    }
}

/// Get cached schema or None
pub fn get_cached(ddl: &str) -> Option<Schema> {
    SCHEMA_CACHE.read().ok()?.get(ddl)
}

/// Cache a parsed schema
pub fn cache_schema(ddl: &str, schema: Schema) {
    if let Ok(mut cache) = SCHEMA_CACHE.write() {
        cache.insert(ddl, schema);
    }
}
