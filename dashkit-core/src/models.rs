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

pub mod accessor;
pub mod cache;
pub mod declaration;
pub mod factories;
pub mod factory;
pub mod identity;
pub mod lazy;
pub mod manager;
pub mod persistence;
pub mod placement;
pub mod resolver;
pub mod state;
pub mod widget;

pub use accessor::*;
pub use cache::*;
pub use declaration::*;
pub use factories::*;
pub use factory::*;
pub use identity::*;
pub use lazy::*;
pub use manager::*;
pub use persistence::*;
pub use placement::*;
pub use resolver::*;
pub use state::*;
pub use widget::*;
