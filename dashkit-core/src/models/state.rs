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

use serde_json::Value;

use crate::error::{Result, WidgetError};
use crate::models::widget::WidgetComponent;

/// Codec between a widget's in-memory state and the persisted byte form.
pub trait ComponentStateSerializer: Send + Sync {
    fn serialize_state(&self, widget: &dyn WidgetComponent) -> Result<Vec<u8>>;

    fn restore_state(&self, widget: &mut dyn WidgetComponent, state: &[u8]) -> Result<()>;
}

/// JSON codec for widget state.
pub struct JsonStateSerializer;

impl ComponentStateSerializer for JsonStateSerializer {
    fn serialize_state(&self, widget: &dyn WidgetComponent) -> Result<Vec<u8>> {
        serde_json::to_vec(&widget.save_state())
            .map_err(|err| WidgetError::InvalidState(format!("could not serialize state: {}", err)))
    }

    fn restore_state(&self, widget: &mut dyn WidgetComponent, state: &[u8]) -> Result<()> {
        let value: Value = serde_json::from_slice(state).map_err(|err| {
            WidgetError::InvalidState(format!("could not deserialize state: {}", err))
        })?;
        widget.load_state(&value).map_err(WidgetError::InvalidState)
    }
}
