// Dashkit - A pluggable dashboard widget engine built with Rust
// Copyright (C) 2026 Dashkit Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Key/value backend for the lazy registry's widget map.
///
/// The cache is a performance optimization only: callers treat every fault
/// as a miss and rebuild, so correctness never depends on it.
#[async_trait]
pub trait WidgetCache: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    async fn save(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
}

/// The persisted widget map together with the checksum of the factory name
/// list that produced it. Stored as one value so both fields are written
/// together; the entry is valid only while the checksum matches the
/// current list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub checksum: String,
    pub map: HashMap<String, String>,
}

/// In-memory [`WidgetCache`] for tests and cacheless deployments.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WidgetCache for MemoryCache {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.load("map").await.unwrap(), None);

        cache.save("map", b"payload").await.unwrap();
        assert_eq!(cache.load("map").await.unwrap(), Some(b"payload".to_vec()));
        assert_eq!(cache.len(), 1);

        cache.save("map", b"replaced").await.unwrap();
        assert_eq!(cache.load("map").await.unwrap(), Some(b"replaced".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_entry_roundtrip() {
        let mut map = HashMap::new();
        map.insert("clock".to_string(), "widgets.clock".to_string());
        let entry = CacheEntry {
            checksum: "abc".to_string(),
            map,
        };

        let bytes = serde_json::to_vec(&entry).unwrap();
        let parsed: CacheEntry = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, entry);
    }
}
