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

/// Source of the current user's identity.
pub trait UserIdentityAccessor: Send + Sync {
    /// Fails with [`WidgetError::NoActiveUser`] when nobody is
    /// authenticated.
    ///
    /// [`WidgetError::NoActiveUser`]: crate::error::WidgetError::NoActiveUser
    fn current_user_id(&self) -> Result<i64>;
}

/// Identity source with a fixed user id, for single-user hosts and tests.
pub struct FixedUserIdentity {
    user_id: i64,
}

impl FixedUserIdentity {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

impl UserIdentityAccessor for FixedUserIdentity {
    fn current_user_id(&self) -> Result<i64> {
        Ok(self.user_id)
    }
}
