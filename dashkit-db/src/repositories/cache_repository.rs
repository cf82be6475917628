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

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashkit_core::models::cache::WidgetCache;
use sqlx::SqlitePool;

/// Key/value store backing the lazy registry's widget map cache.
///
/// Each entry is one row, so the map and its checksum land in the database
/// in a single write.
pub struct CacheRepository {
    pool: SqlitePool,
}

impl CacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row = sqlx::query_as::<_, (Vec<u8>,)>(
            "SELECT cache_value FROM widget_cache WHERE cache_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to read widget cache entry")?;

        Ok(row.map(|(value,)| value))
    }

    pub async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO widget_cache (cache_key, cache_value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(cache_key) DO UPDATE
            SET cache_value = excluded.cache_value, updated_at = datetime('now')
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .context("Failed to write widget cache entry")?;

        Ok(())
    }
}

#[async_trait]
impl WidgetCache for CacheRepository {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get(key).await
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        self.put(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn setup_test_db(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS widget_cache (
                cache_key TEXT PRIMARY KEY,
                cache_value BLOB NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    #[sqlx::test]
    async fn test_get_missing_key() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let repo = CacheRepository::new(pool);

        assert_eq!(repo.get("missing").await?, None);
        Ok(())
    }

    #[sqlx::test]
    async fn test_put_and_get() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let repo = CacheRepository::new(pool);

        repo.put("dashkit.widgets.default.map", b"payload").await?;
        assert_eq!(
            repo.get("dashkit.widgets.default.map").await?,
            Some(b"payload".to_vec())
        );
        Ok(())
    }

    #[sqlx::test]
    async fn test_put_overwrites_existing_entry() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let repo = CacheRepository::new(pool);

        repo.put("key", b"first").await?;
        repo.put("key", b"second").await?;
        assert_eq!(repo.get("key").await?, Some(b"second".to_vec()));

        let count = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM widget_cache")
            .fetch_one(&repo.pool)
            .await?;
        assert_eq!(count.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_widget_cache_trait_roundtrip() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;
        setup_test_db(&pool).await?;
        let repo = CacheRepository::new(pool);
        let cache: &dyn WidgetCache = &repo;

        cache.save("key", b"value").await?;
        assert_eq!(cache.load("key").await?, Some(b"value".to_vec()));
        Ok(())
    }
}
