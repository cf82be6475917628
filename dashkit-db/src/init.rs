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
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize the database, creating the file if needed and the schema
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    // Create database directory if it doesn't exist
    if database_url.starts_with("sqlite:") {
        let path = database_url.trim_start_matches("sqlite:");
        if !path.starts_with(":memory:") && !path.is_empty() {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create the widget tables if they don't exist yet. Safe to call on every
/// startup.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS widget_placements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            namespace TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            widget_type_id TEXT NOT NULL,
            state BLOB,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create widget_placements table")?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_widget_placements_user
        ON widget_placements(namespace, user_id)
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create widget_placements index")?;

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
    .await
    .context("Failed to create widget_cache table")?;

    tracing::debug!("widget schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn test_init_in_memory_database() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;

        // the schema must be queryable
        sqlx::query("SELECT COUNT(*) FROM widget_placements")
            .execute(&pool)
            .await?;
        sqlx::query("SELECT COUNT(*) FROM widget_cache")
            .execute(&pool)
            .await?;
        Ok(())
    }

    #[sqlx::test]
    async fn test_create_schema_is_idempotent() -> Result<()> {
        let pool = SqlitePool::connect(":memory:").await?;

        create_schema(&pool).await?;
        create_schema(&pool).await?;
        Ok(())
    }
}
