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
use chrono::{DateTime, Utc};
use dashkit_core::models::persistence::WidgetPersister;
use dashkit_core::models::placement::WidgetPlacement;
use sqlx::SqlitePool;

type PlacementRow = (
    i64,
    String,
    i64,
    String,
    Option<Vec<u8>>,
    String,
    String,
);

pub struct PlacementRepository {
    pool: SqlitePool,
}

impl PlacementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, placement: &WidgetPlacement) -> Result<i64> {
        if let Err(reason) = placement.is_valid() {
            return Err(anyhow::anyhow!("Invalid widget placement: {}", reason));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO widget_placements (namespace, user_id, widget_type_id, state, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&placement.namespace)
        .bind(placement.user_id)
        .bind(&placement.widget_type_id)
        .bind(&placement.state)
        .bind(placement.created_at.to_rfc3339())
        .bind(placement.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to create widget placement")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<WidgetPlacement>> {
        let row = sqlx::query_as::<_, PlacementRow>(
            r#"
            SELECT
                id,
                namespace,
                user_id,
                widget_type_id,
                state,
                created_at,
                updated_at
            FROM widget_placements
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find widget placement by id")?;

        match row {
            Some(row) => Ok(Some(row_to_placement(row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_user(
        &self,
        namespace: &str,
        user_id: i64,
    ) -> Result<Vec<WidgetPlacement>> {
        let rows = sqlx::query_as::<_, PlacementRow>(
            r#"
            SELECT
                id,
                namespace,
                user_id,
                widget_type_id,
                state,
                created_at,
                updated_at
            FROM widget_placements
            WHERE namespace = ? AND user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(namespace)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list widget placements")?;

        rows.into_iter().map(row_to_placement).collect()
    }

    pub async fn delete_for_user(&self, user_id: i64, placement_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM widget_placements WHERE id = ? AND user_id = ?")
            .bind(placement_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete widget placement")?;

        Ok(())
    }

    pub async fn update_state(
        &self,
        user_id: i64,
        placement_id: i64,
        state: &[u8],
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE widget_placements
            SET state = ?, updated_at = datetime('now')
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(state)
        .bind(placement_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to update widget placement state")?;

        Ok(())
    }
}

#[async_trait]
impl WidgetPersister for PlacementRepository {
    async fn load_placements(
        &self,
        namespace: &str,
        user_id: i64,
    ) -> Result<Vec<WidgetPlacement>> {
        self.list_by_user(namespace, user_id).await
    }

    async fn insert_placement(&self, placement: &WidgetPlacement) -> Result<i64> {
        self.create(placement).await
    }

    async fn remove_placement(&self, user_id: i64, placement_id: i64) -> Result<()> {
        self.delete_for_user(user_id, placement_id).await
    }

    async fn save_state(&self, user_id: i64, placement_id: i64, state: &[u8]) -> Result<()> {
        self.update_state(user_id, placement_id, state).await
    }
}

fn row_to_placement(row: PlacementRow) -> Result<WidgetPlacement> {
    let (id, namespace, user_id, widget_type_id, state, created_at_str, updated_at_str) = row;

    Ok(WidgetPlacement {
        id: Some(id),
        namespace,
        user_id,
        widget_type_id,
        state,
        created_at: parse_datetime(&created_at_str)?,
        updated_at: parse_datetime(&updated_at_str)?,
    })
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    if value.contains('T') {
        Ok(DateTime::parse_from_rfc3339(value)
            .context("Failed to parse datetime as RFC3339")?
            .with_timezone(&Utc))
    } else {
        Ok(chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .context("Failed to parse datetime as SQLite format")?
            .and_utc())
    }
}
