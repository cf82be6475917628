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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One widget placed on a user's dashboard, with its persisted state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetPlacement {
    pub id: Option<i64>,
    pub namespace: String,
    pub user_id: i64,
    pub widget_type_id: String,
    pub state: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WidgetPlacement {
    pub fn new(namespace: impl Into<String>, user_id: i64, widget_type_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            namespace: namespace.into(),
            user_id,
            widget_type_id: widget_type_id.into(),
            state: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_state(mut self, state: Vec<u8>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn validate_namespace(&self) -> Result<(), String> {
        if self.namespace.is_empty() {
            return Err("Namespace cannot be empty".to_string());
        }

        if self.namespace.len() > 50 {
            return Err("Namespace cannot exceed 50 characters".to_string());
        }

        Ok(())
    }

    pub fn validate_widget_type_id(&self) -> Result<(), String> {
        if self.widget_type_id.is_empty() {
            return Err("Widget type id cannot be empty".to_string());
        }

        if self.widget_type_id.len() > 128 {
            return Err("Widget type id cannot exceed 128 characters".to_string());
        }

        Ok(())
    }

    pub fn is_valid(&self) -> Result<(), String> {
        self.validate_namespace()?;
        self.validate_widget_type_id()?;

        if self.user_id <= 0 {
            return Err("User ID must be positive".to_string());
        }

        Ok(())
    }
}
