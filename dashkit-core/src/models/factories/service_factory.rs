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

use std::sync::Arc;

use crate::error::Result;
use crate::models::declaration::WidgetDeclaration;
use crate::models::factory::WidgetDeclarationFactory;
use crate::models::resolver::{ServiceHandle, ServiceResolver};

/// Declaration factory wrapping a single named service.
///
/// The service is resolved when the widget is constructed, not when the
/// declaration is created, so the declaration itself stays cheap and the
/// backing service can keep living in the host's container. A service that
/// turns out to be a [`WidgetComponentFactory`] is asked once more for the
/// actual instance.
///
/// [`WidgetComponentFactory`]: crate::models::widget::WidgetComponentFactory
pub struct ServiceDeclarationFactory {
    widget_type_id: String,
    service_name: String,
    unique: bool,
    resolver: Arc<dyn ServiceResolver>,
}

impl ServiceDeclarationFactory {
    pub fn new(
        widget_type_id: impl Into<String>,
        service_name: impl Into<String>,
        unique: bool,
        resolver: Arc<dyn ServiceResolver>,
    ) -> Self {
        Self {
            widget_type_id: widget_type_id.into(),
            service_name: service_name.into(),
            unique,
            resolver,
        }
    }
}

impl WidgetDeclarationFactory for ServiceDeclarationFactory {
    fn create(&self) -> Result<Vec<WidgetDeclaration>> {
        let resolver = Arc::clone(&self.resolver);
        let service_name = self.service_name.clone();
        Ok(vec![WidgetDeclaration::new(
            self.widget_type_id.clone(),
            self.unique,
            move || match resolver.resolve(&service_name)? {
                ServiceHandle::Component(component) => Ok(component),
                ServiceHandle::Factory(factory) => Ok(factory.create()),
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WidgetError;
    use crate::models::resolver::StaticServiceResolver;
    use crate::models::widget::{WidgetComponent, WidgetComponentFactory};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct NullWidget;

    impl WidgetComponent for NullWidget {}

    struct CountingComponentFactory {
        calls: Arc<AtomicUsize>,
    }

    impl WidgetComponentFactory for CountingComponentFactory {
        fn create(&self) -> Box<dyn WidgetComponent> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::new(NullWidget)
        }
    }

    #[test]
    fn test_create_yields_single_declaration() {
        let resolver = Arc::new(StaticServiceResolver::new());
        let factory = ServiceDeclarationFactory::new("clock", "widgets.clock", true, resolver);

        let declarations = factory.create().unwrap();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].type_id(), "clock");
        assert!(declarations[0].is_unique());
    }

    #[test]
    fn test_service_resolved_at_construction_time() {
        // The declaration can be created before the service is registered,
        // as long as the service exists by the time the widget is built.
        let resolver = Arc::new(Mutex::new(StaticServiceResolver::new()));

        struct SharedResolver(Arc<Mutex<StaticServiceResolver>>);

        impl ServiceResolver for SharedResolver {
            fn resolve(&self, name: &str) -> Result<ServiceHandle> {
                self.0.lock().unwrap().resolve(name)
            }
        }

        let factory = ServiceDeclarationFactory::new(
            "clock",
            "widgets.clock",
            false,
            Arc::new(SharedResolver(resolver.clone())),
        );
        let declarations = factory.create().unwrap();

        assert!(matches!(
            declarations[0].create_instance(),
            Err(WidgetError::ServiceNotFound(_))
        ));

        resolver
            .lock()
            .unwrap()
            .register_component("widgets.clock", || Box::new(NullWidget));
        assert!(declarations[0].create_instance().is_ok());
    }

    #[test]
    fn test_component_factory_gets_second_create_hop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut resolver = StaticServiceResolver::new();
        resolver.register_factory(
            "widgets.clock",
            Arc::new(CountingComponentFactory {
                calls: calls.clone(),
            }),
        );

        let factory =
            ServiceDeclarationFactory::new("clock", "widgets.clock", false, Arc::new(resolver));
        let declarations = factory.create().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let _widget = declarations[0].create_instance().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_service_fails_construction() {
        let resolver = Arc::new(StaticServiceResolver::new());
        let factory = ServiceDeclarationFactory::new("clock", "gone", false, resolver);

        let declarations = factory.create().unwrap();
        assert!(matches!(
            declarations[0].create_instance(),
            Err(WidgetError::ServiceNotFound(name)) if name == "gone"
        ));
    }
}
