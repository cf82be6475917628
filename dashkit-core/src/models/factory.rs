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

use crate::error::Result;
use crate::models::declaration::WidgetDeclaration;

/// Produces widget declarations on demand.
///
/// A factory may back several widget kinds at once, so `create` returns an
/// ordered list (usually with a single element). The output must not depend
/// on the caller or the current request: the lazy registry re-invokes
/// factories in later processes and verifies that every type id promised by
/// the cached map is produced again.
pub trait WidgetDeclarationFactory: Send + Sync {
    fn create(&self) -> Result<Vec<WidgetDeclaration>>;
}
