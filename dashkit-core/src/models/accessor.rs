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

use crate::error::{Result, WidgetError};
use crate::models::manager::WidgetManager;

/// Lookup of widget managers by namespace, for hosts that run several
/// independent widget catalogues side by side.
#[derive(Default)]
pub struct WidgetManagerAccessor {
    managers: HashMap<String, Box<dyn WidgetManager>>,
}

impl WidgetManagerAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, namespace: impl Into<String>, manager: Box<dyn WidgetManager>) {
        self.managers.insert(namespace.into(), manager);
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.managers.contains_key(namespace)
    }

    pub fn get_mut(&mut self, namespace: &str) -> Result<&mut dyn WidgetManager> {
        match self.managers.get_mut(namespace) {
            Some(manager) => Ok(&mut **manager),
            None => Err(WidgetError::UnknownNamespace(namespace.to_string())),
        }
    }

    /// Registered namespaces, sorted for stable output.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.managers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
