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

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::declaration::WidgetDeclaration;
use crate::models::factory::WidgetDeclarationFactory;
use crate::models::widget::WidgetComponent;
use crate::utils::checksum::sha256_hex;

/// Marker mixed into the type id hash so template widgets can never
/// collide with ids derived by other factory kinds.
const TEMPLATE_FACTORY_KIND: &str = "dashkit.template-widget";

/// Declaration factory binding a template file and fixed arguments.
///
/// The type id is a content hash over the template path and the arguments.
/// Two factories configured identically therefore produce the same id and
/// are treated as the same widget, which keeps configuration idempotent
/// across redeployments. The base path is excluded from the hash: moving
/// the template root must not change widget identity.
pub struct TemplateDeclarationFactory {
    base_path: PathBuf,
    template_path: String,
    template_args: Map<String, Value>,
    unique: bool,
}

impl TemplateDeclarationFactory {
    pub fn new(
        base_path: impl Into<PathBuf>,
        template_path: impl Into<String>,
        template_args: Map<String, Value>,
        unique: bool,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            template_path: template_path.into(),
            template_args,
            unique,
        }
    }

    /// Derived widget type id for this configuration.
    pub fn widget_type_id(&self) -> Result<String> {
        let args = serde_json::to_vec(&self.template_args)
            .context("failed to serialize template arguments")?;
        Ok(sha256_hex([
            TEMPLATE_FACTORY_KIND.as_bytes(),
            self.template_path.as_bytes(),
            args.as_slice(),
        ]))
    }
}

impl WidgetDeclarationFactory for TemplateDeclarationFactory {
    fn create(&self) -> Result<Vec<WidgetDeclaration>> {
        let template_file = self.base_path.join(&self.template_path);
        let args = self.template_args.clone();
        Ok(vec![WidgetDeclaration::new(
            self.widget_type_id()?,
            self.unique,
            move || {
                Ok(Box::new(TemplateWidget::new(template_file.clone(), args.clone()))
                    as Box<dyn WidgetComponent>)
            },
        )])
    }
}

/// Widget rendered by the host from a template file and fixed arguments.
///
/// The state object is free-form; whatever the host stores comes back on
/// the next request.
pub struct TemplateWidget {
    template_file: PathBuf,
    args: Map<String, Value>,
    state: Value,
}

impl TemplateWidget {
    pub fn new(template_file: PathBuf, args: Map<String, Value>) -> Self {
        Self {
            template_file,
            args,
            state: Value::Object(Map::new()),
        }
    }

    pub fn template_file(&self) -> &Path {
        &self.template_file
    }

    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }
}

impl WidgetComponent for TemplateWidget {
    fn save_state(&self) -> Value {
        self.state.clone()
    }

    fn load_state(&mut self, state: &Value) -> std::result::Result<(), String> {
        if !state.is_object() {
            return Err("template widget state must be a JSON object".to_string());
        }
        self.state = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_type_id_is_deterministic() {
        let factory = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("limit", json!(5))]),
            true,
        );
        assert_eq!(
            factory.widget_type_id().unwrap(),
            factory.widget_type_id().unwrap()
        );
    }

    #[test]
    fn test_identical_configurations_collide() {
        let first = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("limit", json!(5))]),
            true,
        );
        let second = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("limit", json!(5))]),
            true,
        );
        assert_eq!(
            first.widget_type_id().unwrap(),
            second.widget_type_id().unwrap()
        );
    }

    #[test]
    fn test_base_path_does_not_affect_type_id() {
        let first = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            Map::new(),
            true,
        );
        let second =
            TemplateDeclarationFactory::new("/opt/app", "widgets/news.html", Map::new(), true);
        assert_eq!(
            first.widget_type_id().unwrap(),
            second.widget_type_id().unwrap()
        );
    }

    #[test]
    fn test_template_path_and_args_affect_type_id() {
        let base = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("limit", json!(5))]),
            true,
        );
        let other_path = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/weather.html",
            args(&[("limit", json!(5))]),
            true,
        );
        let other_args = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("limit", json!(10))]),
            true,
        );
        assert_ne!(
            base.widget_type_id().unwrap(),
            other_path.widget_type_id().unwrap()
        );
        assert_ne!(
            base.widget_type_id().unwrap(),
            other_args.widget_type_id().unwrap()
        );
    }

    #[test]
    fn test_argument_insertion_order_is_irrelevant() {
        let first = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("a", json!(1)), ("b", json!(2))]),
            true,
        );
        let second = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("b", json!(2)), ("a", json!(1))]),
            true,
        );
        assert_eq!(
            first.widget_type_id().unwrap(),
            second.widget_type_id().unwrap()
        );
    }

    #[test]
    fn test_create_builds_template_widget() {
        let factory = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            args(&[("limit", json!(5))]),
            false,
        );

        let declarations = factory.create().unwrap();
        assert_eq!(declarations.len(), 1);
        assert!(!declarations[0].is_unique());
        assert_eq!(
            declarations[0].type_id(),
            factory.widget_type_id().unwrap()
        );

        let _widget = declarations[0].create_instance().unwrap();
    }

    #[test]
    fn test_template_widget_state() {
        let mut widget =
            TemplateWidget::new(PathBuf::from("/srv/templates/widgets/news.html"), Map::new());
        assert_eq!(widget.save_state(), json!({}));

        widget.load_state(&json!({"collapsed": true})).unwrap();
        assert_eq!(widget.save_state(), json!({"collapsed": true}));

        assert!(widget.load_state(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_template_file_joins_base_path() {
        let factory = TemplateDeclarationFactory::new(
            "/srv/templates",
            "widgets/news.html",
            Map::new(),
            false,
        );
        let template_file = factory.base_path.join(&factory.template_path);
        assert_eq!(
            template_file,
            PathBuf::from("/srv/templates/widgets/news.html")
        );
    }
}
