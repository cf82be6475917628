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
use crate::models::widget::WidgetComponentFactory;

/// Declaration factory wrapping an already-resolved component factory.
///
/// Unlike [`ServiceDeclarationFactory`] there is no name lookup left to do;
/// the wiring layer hands over the component factory itself.
///
/// [`ServiceDeclarationFactory`]: crate::models::factories::ServiceDeclarationFactory
pub struct ComponentDeclarationFactory {
    widget_type_id: String,
    unique: bool,
    component_factory: Arc<dyn WidgetComponentFactory>,
}

impl ComponentDeclarationFactory {
    pub fn new(
        widget_type_id: impl Into<String>,
        unique: bool,
        component_factory: Arc<dyn WidgetComponentFactory>,
    ) -> Self {
        Self {
            widget_type_id: widget_type_id.into(),
            unique,
            component_factory,
        }
    }
}

impl WidgetDeclarationFactory for ComponentDeclarationFactory {
    fn create(&self) -> Result<Vec<WidgetDeclaration>> {
        let component_factory = Arc::clone(&self.component_factory);
        Ok(vec![WidgetDeclaration::new(
            self.widget_type_id.clone(),
            self.unique,
            move || Ok(component_factory.create()),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::widget::WidgetComponent;
    use std::sync::atomic::{AtomicUsize, Ordering};

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
        let factory = ComponentDeclarationFactory::new(
            "clock",
            true,
            Arc::new(CountingComponentFactory {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );

        let declarations = factory.create().unwrap();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].type_id(), "clock");
        assert!(declarations[0].is_unique());
    }

    #[test]
    fn test_every_instance_is_fresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = ComponentDeclarationFactory::new(
            "clock",
            false,
            Arc::new(CountingComponentFactory {
                calls: calls.clone(),
            }),
        );

        let declarations = factory.create().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        declarations[0].create_instance().unwrap();
        declarations[0].create_instance().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
