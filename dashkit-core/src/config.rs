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

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Result, WidgetError};
use crate::models::accessor::WidgetManagerAccessor;
use crate::models::cache::WidgetCache;
use crate::models::identity::UserIdentityAccessor;
use crate::models::lazy::LazyWidgetRegistry;
use crate::models::manager::{WidgetManager, WidgetRegistry};
use crate::models::persistence::{PlacementCoordinator, WidgetPersister};
use crate::models::resolver::FactoryResolver;
use crate::models::state::ComponentStateSerializer;

pub const DEFAULT_NAMESPACE: &str = "default";

/// Configuration of one widget namespace.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceConfig {
    /// Ordered declaration-factory names; the order is part of the cache
    /// fingerprint.
    pub factories: Vec<String>,
    /// Resolve every factory name up front, surfacing dead references at
    /// load time instead of on the first request.
    #[serde(default = "default_true")]
    pub validate: bool,
    /// Use the lazy registry with the persisted type-id map. Requires
    /// `validate`.
    #[serde(default = "default_true")]
    pub optimize: bool,
}

fn default_true() -> bool {
    true
}

impl NamespaceConfig {
    pub fn new(factories: Vec<String>) -> Self {
        Self {
            factories,
            validate: true,
            optimize: true,
        }
    }
}

/// Widget configuration for all namespaces.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetsConfig {
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceConfig>,
}

impl WidgetsConfig {
    /// Convenience for the common single-catalogue setup.
    pub fn single_namespace(factories: Vec<String>) -> Self {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(DEFAULT_NAMESPACE.to_string(), NamespaceConfig::new(factories));
        Self { namespaces }
    }
}

/// Assembles one widget manager per configured namespace.
pub struct WidgetManagerBuilder {
    resolver: Arc<dyn FactoryResolver>,
    cache: Arc<dyn WidgetCache>,
    identity: Arc<dyn UserIdentityAccessor>,
    persister: Arc<dyn WidgetPersister>,
    serializer: Arc<dyn ComponentStateSerializer>,
}

impl WidgetManagerBuilder {
    pub fn new(
        resolver: Arc<dyn FactoryResolver>,
        cache: Arc<dyn WidgetCache>,
        identity: Arc<dyn UserIdentityAccessor>,
        persister: Arc<dyn WidgetPersister>,
        serializer: Arc<dyn ComponentStateSerializer>,
    ) -> Self {
        Self {
            resolver,
            cache,
            identity,
            persister,
            serializer,
        }
    }

    pub fn build(&self, config: &WidgetsConfig) -> Result<WidgetManagerAccessor> {
        let mut accessor = WidgetManagerAccessor::new();
        for (namespace, namespace_config) in &config.namespaces {
            accessor.insert(
                namespace.clone(),
                self.build_namespace(namespace, namespace_config)?,
            );
        }
        Ok(accessor)
    }

    fn build_namespace(
        &self,
        namespace: &str,
        config: &NamespaceConfig,
    ) -> Result<Box<dyn WidgetManager>> {
        if config.optimize && !config.validate {
            return Err(WidgetError::IllegalOperation(format!(
                "cannot optimize widget namespace '{}' without validation",
                namespace
            )));
        }

        if config.validate {
            for name in &config.factories {
                self.resolver.resolve(name)?;
            }
        }

        let coordinator = PlacementCoordinator::new(
            namespace,
            self.identity.clone(),
            self.persister.clone(),
            self.serializer.clone(),
        );

        if config.optimize {
            tracing::debug!(
                "namespace '{}' uses the lazy widget registry ({} factories)",
                namespace,
                config.factories.len()
            );
            Ok(Box::new(LazyWidgetRegistry::new(
                config.factories.clone(),
                self.resolver.clone(),
                self.cache.clone(),
                coordinator,
            )))
        } else {
            let mut registry = WidgetRegistry::new(coordinator);
            for name in &config.factories {
                registry.add_widget_factory(self.resolver.resolve(name)?)?;
            }
            Ok(Box::new(registry))
        }
    }
}
