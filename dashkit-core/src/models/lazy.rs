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
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, WidgetError};
use crate::models::cache::{CacheEntry, WidgetCache};
use crate::models::declaration::WidgetDeclaration;
use crate::models::factory::WidgetDeclarationFactory;
use crate::models::manager::{AvailableWidget, WidgetManager};
use crate::models::persistence::{PlacedWidget, PlacementCoordinator};
use crate::models::resolver::FactoryResolver;
use crate::models::widget::WidgetComponent;
use crate::utils::checksum::sha256_hex;

const CACHE_KEY_PREFIX: &str = "dashkit.widgets";

/// Widget registry that defers factory invocation until a type id under a
/// factory is actually requested.
///
/// The expensive full scan ("invoke every factory") runs at most once per
/// factory-name list: its result, the type-id → factory-name map, is kept
/// in the cache backend together with a checksum of the ordered name list
/// and adopted by later processes as long as the list is unchanged.
/// Declarations themselves are materialized per factory, on first use, and
/// memoized for the life of the registry instance.
///
/// The factory set is fixed at construction; `add_widget_declaration` and
/// `add_widget_factory` always fail.
pub struct LazyWidgetRegistry {
    service_list: Vec<String>,
    resolver: Arc<dyn FactoryResolver>,
    cache: Arc<dyn WidgetCache>,
    map: Option<HashMap<String, String>>,
    loaded: HashMap<String, Vec<WidgetDeclaration>>,
    coordinator: PlacementCoordinator,
}

impl LazyWidgetRegistry {
    pub fn new(
        service_list: Vec<String>,
        resolver: Arc<dyn FactoryResolver>,
        cache: Arc<dyn WidgetCache>,
        coordinator: PlacementCoordinator,
    ) -> Self {
        Self {
            service_list,
            resolver,
            cache,
            map: None,
            loaded: HashMap::new(),
            coordinator,
        }
    }

    fn cache_key(&self) -> String {
        format!("{}.{}.map", CACHE_KEY_PREFIX, self.coordinator.namespace())
    }

    /// Checksum of the ordered factory-name list. Names are length-prefixed
    /// so list boundaries cannot be forged by concatenation.
    fn service_list_checksum(&self) -> String {
        let mut buffer = Vec::new();
        for name in &self.service_list {
            buffer.extend_from_slice(&(name.len() as u64).to_le_bytes());
            buffer.extend_from_slice(name.as_bytes());
        }
        sha256_hex([buffer.as_slice()])
    }

    /// Loads the type-id map, from cache when the stored checksum matches
    /// the current factory-name list, otherwise by invoking every factory
    /// once. Cache faults degrade to a rebuild.
    async fn ensure_map_loaded(&mut self) -> Result<()> {
        if self.map.is_some() {
            return Ok(());
        }

        let checksum = self.service_list_checksum();
        if let Some(entry) = self.load_cached_map(&checksum).await {
            tracing::debug!(
                "adopted cached widget map for namespace '{}' ({} type ids)",
                self.coordinator.namespace(),
                entry.map.len()
            );
            self.map = Some(entry.map);
            return Ok(());
        }

        let mut map: HashMap<String, String> = HashMap::new();
        let mut loaded: HashMap<String, Vec<WidgetDeclaration>> = HashMap::new();

        for service_name in &self.service_list {
            let factory = self.resolver.resolve(service_name)?;
            let declarations = factory.create()?;
            for declaration in &declarations {
                if let Some(existing) = map.get(declaration.type_id()) {
                    return Err(WidgetError::DuplicateTypeId {
                        type_id: declaration.type_id().to_string(),
                        existing: existing.clone(),
                        duplicate: service_name.clone(),
                    });
                }
                map.insert(declaration.type_id().to_string(), service_name.clone());
            }
            loaded.insert(service_name.clone(), declarations);
        }

        tracing::debug!(
            "rebuilt widget map for namespace '{}' ({} type ids from {} factories)",
            self.coordinator.namespace(),
            map.len(),
            self.service_list.len()
        );

        self.write_cached_map(&checksum, &map).await;
        // keep the declarations from the scan; no factory runs twice in
        // one process lifetime
        self.loaded = loaded;
        self.map = Some(map);
        Ok(())
    }

    async fn load_cached_map(&self, checksum: &str) -> Option<CacheEntry> {
        let bytes = match self.cache.load(&self.cache_key()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    "widget map cache read failed for namespace '{}', rebuilding: {:#}",
                    self.coordinator.namespace(),
                    err
                );
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.checksum == checksum => Some(entry),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(
                    "discarding unreadable widget map cache entry for namespace '{}': {}",
                    self.coordinator.namespace(),
                    err
                );
                None
            }
        }
    }

    async fn write_cached_map(&self, checksum: &str, map: &HashMap<String, String>) {
        let entry = CacheEntry {
            checksum: checksum.to_string(),
            map: map.clone(),
        };
        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("could not serialize widget map cache entry: {}", err);
                return;
            }
        };
        if let Err(err) = self.cache.save(&self.cache_key(), &bytes).await {
            tracing::warn!(
                "widget map cache write failed for namespace '{}': {:#}",
                self.coordinator.namespace(),
                err
            );
        }
    }

    /// Materializes one factory's declarations, memoized per factory name
    /// for the life of this instance.
    fn load_factory(&mut self, service_name: &str) -> Result<()> {
        if self.loaded.contains_key(service_name) {
            return Ok(());
        }
        let factory = self.resolver.resolve(service_name)?;
        let declarations = factory.create()?;
        self.loaded
            .insert(service_name.to_string(), declarations);
        Ok(())
    }

    /// Looks up the declaration for a type id, invoking only the factory
    /// the map attributes it to.
    pub async fn resolve(&mut self, type_id: &str) -> Result<WidgetDeclaration> {
        self.ensure_map_loaded().await?;

        let service_name = match self.map.as_ref().and_then(|map| map.get(type_id)) {
            Some(service_name) => service_name.clone(),
            None => return Err(WidgetError::UnknownWidgetType(type_id.to_string())),
        };

        self.load_factory(&service_name)?;
        self.loaded
            .get(&service_name)
            .and_then(|declarations| {
                declarations
                    .iter()
                    .find(|declaration| declaration.type_id() == type_id)
            })
            .cloned()
            .ok_or_else(|| WidgetError::ContextDependentFactory {
                factory: service_name,
                type_id: type_id.to_string(),
            })
    }

    /// Factory names the map references, in service-list order, deduplicated.
    fn referenced_service_names(&self) -> Vec<String> {
        match self.map.as_ref() {
            Some(map) => self
                .service_list
                .iter()
                .filter(|name| map.values().any(|owner| owner == *name))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl WidgetManager for LazyWidgetRegistry {
    fn add_widget_declaration(&mut self, _declaration: WidgetDeclaration) -> Result<()> {
        Err(WidgetError::IllegalOperation(
            "cannot add declarations to a lazy widget registry; register the factory in the service list instead".to_string(),
        ))
    }

    fn add_widget_factory(&mut self, _factory: Arc<dyn WidgetDeclarationFactory>) -> Result<()> {
        Err(WidgetError::IllegalOperation(
            "cannot add factories to a lazy widget registry; register the factory in the service list instead".to_string(),
        ))
    }

    async fn get_available_widgets(&mut self) -> Result<Vec<AvailableWidget>> {
        self.ensure_map_loaded().await?;
        let placed = self.coordinator.user_type_ids_or_empty().await?;

        // answering "what is available" needs every declaration, so all
        // referenced factories are materialized here
        let referenced = self.referenced_service_names();
        for service_name in &referenced {
            self.load_factory(service_name)?;
        }

        let mut widgets = Vec::new();
        for service_name in &referenced {
            let declarations = match self.loaded.get(service_name) {
                Some(declarations) => declarations,
                None => continue,
            };
            for declaration in declarations {
                if declaration.is_unique() && placed.contains(declaration.type_id()) {
                    continue;
                }
                widgets.push(AvailableWidget {
                    type_id: declaration.type_id().to_string(),
                    component: declaration.create_instance()?,
                });
            }
        }
        Ok(widgets)
    }

    async fn create_widget(&mut self, type_id: &str) -> Result<Box<dyn WidgetComponent>> {
        let declaration = self.resolve(type_id).await?;
        declaration.create_instance()
    }

    async fn get_user_widgets(&mut self) -> Result<Vec<PlacedWidget>> {
        self.ensure_map_loaded().await?;
        let placements = self.coordinator.placements().await?;

        let mut widgets = Vec::new();
        for placement in placements {
            let declaration = match self.resolve(&placement.widget_type_id).await {
                Ok(declaration) => declaration,
                Err(WidgetError::UnknownWidgetType(type_id)) => {
                    tracing::warn!(
                        "skipping placement {:?}: widget type '{}' is no longer registered",
                        placement.id,
                        type_id
                    );
                    continue;
                }
                Err(err) => return Err(err),
            };
            widgets.push(self.coordinator.restore(&declaration, placement)?);
        }
        Ok(widgets)
    }

    async fn place_widget(&mut self, type_id: &str) -> Result<PlacedWidget> {
        let declaration = self.resolve(type_id).await?;
        self.coordinator.place(&declaration).await
    }

    async fn remove_widget(&mut self, placement_id: i64) -> Result<()> {
        self.coordinator.remove(placement_id).await
    }

    async fn save_widget_state(
        &mut self,
        placement_id: i64,
        widget: &dyn WidgetComponent,
    ) -> Result<()> {
        self.coordinator.save_state(placement_id, widget).await
    }
}
