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

use serde_json::{Map, Value};

/// A constructed widget instance.
///
/// Rendering is left to the host framework; the registry only needs to
/// capture and restore widget state across requests. Stateless widgets can
/// implement this trait without overriding anything.
pub trait WidgetComponent: Send + Sync {
    /// Capture the widget's state for persistence.
    fn save_state(&self) -> Value {
        Value::Object(Map::new())
    }

    /// Restore previously captured state.
    fn load_state(&mut self, _state: &Value) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Produces a fresh widget instance on every call.
///
/// Service-backed declarations may point at either a component or a
/// component factory; the latter gets one more `create` hop at
/// construction time.
pub trait WidgetComponentFactory: Send + Sync {
    fn create(&self) -> Box<dyn WidgetComponent>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct BareWidget;

    impl WidgetComponent for BareWidget {}

    #[test]
    fn test_default_state_is_empty_object() {
        let widget = BareWidget;
        assert_eq!(widget.save_state(), json!({}));
    }

    #[test]
    fn test_default_load_state_accepts_anything() {
        let mut widget = BareWidget;
        assert!(widget.load_state(&json!({"anything": 1})).is_ok());
        assert!(widget.load_state(&json!(null)).is_ok());
    }
}
