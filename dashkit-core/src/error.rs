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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("widget type id '{type_id}' from '{duplicate}' is already registered by '{existing}'")]
    DuplicateTypeId {
        type_id: String,
        existing: String,
        duplicate: String,
    },

    #[error("factory '{factory}' did not return the declaration for widget type id '{type_id}'; widget declarations must not depend on request context")]
    ContextDependentFactory { factory: String, type_id: String },

    #[error("unknown widget type id '{0}'")]
    UnknownWidgetType(String),

    #[error("service '{0}' could not be resolved")]
    ServiceNotFound(String),

    #[error("no user is authenticated")]
    NoActiveUser,

    #[error("invalid widget state: {0}")]
    InvalidState(String),

    #[error("illegal operation: {0}")]
    IllegalOperation(String),

    #[error("widget namespace '{0}' was not recognized")]
    UnknownNamespace(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
