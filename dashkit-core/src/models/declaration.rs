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

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::models::widget::WidgetComponent;

type ConstructFn = dyn Fn() -> Result<Box<dyn WidgetComponent>> + Send + Sync;

/// Immutable description of one widget kind: its type id, whether a user
/// may place it more than once, and a zero-argument constructor.
///
/// Cloning shares the constructor; the dependencies it captures belong to
/// the resolver that produced the declaration, not to the registry.
#[derive(Clone)]
pub struct WidgetDeclaration {
    type_id: String,
    unique: bool,
    construct: Arc<ConstructFn>,
}

impl WidgetDeclaration {
    pub fn new<F>(type_id: impl Into<String>, unique: bool, construct: F) -> Self
    where
        F: Fn() -> Result<Box<dyn WidgetComponent>> + Send + Sync + 'static,
    {
        Self {
            type_id: type_id.into(),
            unique,
            construct: Arc::new(construct),
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// A unique widget may be placed by a user at most once.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn create_instance(&self) -> Result<Box<dyn WidgetComponent>> {
        (self.construct)()
    }

    pub fn validate_type_id(&self) -> std::result::Result<(), String> {
        if self.type_id.is_empty() {
            return Err("Widget type id cannot be empty".to_string());
        }

        if self.type_id.len() > 128 {
            return Err("Widget type id cannot exceed 128 characters".to_string());
        }

        Ok(())
    }
}

impl fmt::Debug for WidgetDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDeclaration")
            .field("type_id", &self.type_id)
            .field("unique", &self.unique)
            .finish_non_exhaustive()
    }
}
