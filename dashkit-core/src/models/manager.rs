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
use crate::models::declaration::WidgetDeclaration;
use crate::models::factory::WidgetDeclarationFactory;
use crate::models::persistence::{PlacedWidget, PlacementCoordinator};
use crate::models::widget::WidgetComponent;

/// A widget the current user may still place, keyed by its type id.
/// Results keep registration order.
pub struct AvailableWidget {
    pub type_id: String,
    pub component: Box<dyn WidgetComponent>,
}

/// One widget catalogue: registration, per-user availability, placement
/// and state persistence.
#[async_trait]
pub trait WidgetManager: Send + Sync {
    /// Register a single declaration. Fails once the registry is locked.
    fn add_widget_declaration(&mut self, declaration: WidgetDeclaration) -> Result<()>;

    /// Register a declaration factory. Fails once the registry is locked.
    fn add_widget_factory(&mut self, factory: Arc<dyn WidgetDeclarationFactory>) -> Result<()>;

    /// Widgets the current user may place right now: one instance per type
    /// id, skipping unique widgets the user has already placed. An
    /// unauthenticated user is treated as having no placements.
    async fn get_available_widgets(&mut self) -> Result<Vec<AvailableWidget>>;

    /// A fresh instance of one widget type.
    async fn create_widget(&mut self, type_id: &str) -> Result<Box<dyn WidgetComponent>>;

    /// The current user's placed widgets with their state restored.
    async fn get_user_widgets(&mut self) -> Result<Vec<PlacedWidget>>;

    /// Places a widget for the current user and persists its initial
    /// state.
    async fn place_widget(&mut self, type_id: &str) -> Result<PlacedWidget>;

    /// Removes one of the current user's placements.
    async fn remove_widget(&mut self, placement_id: i64) -> Result<()>;

    /// Persists the widget's current state under an existing placement.
    async fn save_widget_state(
        &mut self,
        placement_id: i64,
        widget: &dyn WidgetComponent,
    ) -> Result<()>;
}

enum Registration {
    Declaration(WidgetDeclaration),
    Factory(Arc<dyn WidgetDeclarationFactory>),
}

impl Registration {
    fn label(&self, position: usize) -> String {
        match self {
            Registration::Declaration(_) => format!("declaration #{}", position + 1),
            Registration::Factory(_) => format!("factory #{}", position + 1),
        }
    }
}

/// Eager widget registry.
///
/// Mutable until the first read operation, which invokes every registered
/// factory once, indexes the flattened declarations and locks the registry
/// for the rest of its life.
pub struct WidgetRegistry {
    registrations: Vec<Registration>,
    declarations: Vec<WidgetDeclaration>,
    index: HashMap<String, usize>,
    locked: bool,
    coordinator: PlacementCoordinator,
}

impl WidgetRegistry {
    pub fn new(coordinator: PlacementCoordinator) -> Self {
        Self {
            registrations: Vec::new(),
            declarations: Vec::new(),
            index: HashMap::new(),
            locked: false,
            coordinator,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Invokes every registered factory once and builds the type id index.
    /// Irreversible; a duplicate type id aborts without locking.
    fn lock_declarations(&mut self) -> Result<()> {
        if self.locked {
            return Ok(());
        }

        let mut declarations: Vec<WidgetDeclaration> = Vec::new();
        let mut sources: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (position, registration) in self.registrations.iter().enumerate() {
            let batch = match registration {
                Registration::Declaration(declaration) => vec![declaration.clone()],
                Registration::Factory(factory) => factory.create()?,
            };
            let label = registration.label(position);

            for declaration in batch {
                if let Some(&existing) = index.get(declaration.type_id()) {
                    return Err(WidgetError::DuplicateTypeId {
                        type_id: declaration.type_id().to_string(),
                        existing: sources[existing].clone(),
                        duplicate: label.clone(),
                    });
                }
                index.insert(declaration.type_id().to_string(), declarations.len());
                sources.push(label.clone());
                declarations.push(declaration);
            }
        }

        tracing::debug!(
            "locked widget registry '{}' with {} declarations",
            self.coordinator.namespace(),
            declarations.len()
        );

        self.declarations = declarations;
        self.index = index;
        self.locked = true;
        Ok(())
    }

    fn resolve_declaration(&mut self, type_id: &str) -> Result<WidgetDeclaration> {
        self.lock_declarations()?;
        self.index
            .get(type_id)
            .and_then(|&position| self.declarations.get(position))
            .cloned()
            .ok_or_else(|| WidgetError::UnknownWidgetType(type_id.to_string()))
    }
}

#[async_trait]
impl WidgetManager for WidgetRegistry {
    fn add_widget_declaration(&mut self, declaration: WidgetDeclaration) -> Result<()> {
        if self.locked {
            return Err(WidgetError::IllegalOperation(
                "cannot add declarations to a locked widget registry".to_string(),
            ));
        }
        self.registrations
            .push(Registration::Declaration(declaration));
        Ok(())
    }

    fn add_widget_factory(&mut self, factory: Arc<dyn WidgetDeclarationFactory>) -> Result<()> {
        if self.locked {
            return Err(WidgetError::IllegalOperation(
                "cannot add factories to a locked widget registry".to_string(),
            ));
        }
        self.registrations.push(Registration::Factory(factory));
        Ok(())
    }

    async fn get_available_widgets(&mut self) -> Result<Vec<AvailableWidget>> {
        self.lock_declarations()?;
        let placed = self.coordinator.user_type_ids_or_empty().await?;

        let mut widgets = Vec::new();
        for declaration in &self.declarations {
            if declaration.is_unique() && placed.contains(declaration.type_id()) {
                // the user already has this one
                continue;
            }
            widgets.push(AvailableWidget {
                type_id: declaration.type_id().to_string(),
                component: declaration.create_instance()?,
            });
        }
        Ok(widgets)
    }

    async fn create_widget(&mut self, type_id: &str) -> Result<Box<dyn WidgetComponent>> {
        let declaration = self.resolve_declaration(type_id)?;
        declaration.create_instance()
    }

    async fn get_user_widgets(&mut self) -> Result<Vec<PlacedWidget>> {
        self.lock_declarations()?;
        let placements = self.coordinator.placements().await?;

        let mut widgets = Vec::new();
        for placement in placements {
            let declaration = match self.resolve_declaration(&placement.widget_type_id) {
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
        let declaration = self.resolve_declaration(type_id)?;
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
