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

use crate::error::{Result, WidgetError};
use crate::models::factory::WidgetDeclarationFactory;
use crate::models::widget::{WidgetComponent, WidgetComponentFactory};

/// What a service name resolves to.
///
/// The wiring layer classifies each registered service once, so the
/// registry never has to probe an opaque object for capabilities.
pub enum ServiceHandle {
    /// A fresh widget instance.
    Component(Box<dyn WidgetComponent>),
    /// A factory that produces the widget instance (one more `create` hop).
    Factory(Arc<dyn WidgetComponentFactory>),
}

/// Resolves service names to widget components or component factories.
pub trait ServiceResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<ServiceHandle>;
}

/// Resolves factory names to declaration factories.
pub trait FactoryResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Arc<dyn WidgetDeclarationFactory>>;
}

type ServiceProvider = Arc<dyn Fn() -> ServiceHandle + Send + Sync>;

/// Map-backed [`ServiceResolver`].
#[derive(Default)]
pub struct StaticServiceResolver {
    services: HashMap<String, ServiceProvider>,
}

impl StaticServiceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, provider: F)
    where
        F: Fn() -> ServiceHandle + Send + Sync + 'static,
    {
        self.services.insert(name.into(), Arc::new(provider));
    }

    pub fn register_component<F>(&mut self, name: impl Into<String>, make: F)
    where
        F: Fn() -> Box<dyn WidgetComponent> + Send + Sync + 'static,
    {
        self.register(name, move || ServiceHandle::Component(make()));
    }

    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: Arc<dyn WidgetComponentFactory>,
    ) {
        self.register(name, move || ServiceHandle::Factory(factory.clone()));
    }
}

impl ServiceResolver for StaticServiceResolver {
    fn resolve(&self, name: &str) -> Result<ServiceHandle> {
        match self.services.get(name) {
            Some(provider) => Ok(provider()),
            None => Err(WidgetError::ServiceNotFound(name.to_string())),
        }
    }
}

/// Map-backed [`FactoryResolver`].
#[derive(Default)]
pub struct StaticFactoryResolver {
    factories: HashMap<String, Arc<dyn WidgetDeclarationFactory>>,
}

impl StaticFactoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: Arc<dyn WidgetDeclarationFactory>,
    ) {
        self.factories.insert(name.into(), factory);
    }
}

impl FactoryResolver for StaticFactoryResolver {
    fn resolve(&self, name: &str) -> Result<Arc<dyn WidgetDeclarationFactory>> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| WidgetError::ServiceNotFound(name.to_string()))
    }
}
