// AVMDBG - Algorand Virtual Machine Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Simulate response model and decoding.
//!
//! - [`model`] holds the typed response, mirroring algod's `SimulateResponse` JSON.
//! - [`decode`] turns trace file bytes into a validated response. Both the canonical JSON
//!   encoding and the legacy one (base64 binary fields, raw-key addresses) are accepted.

mod address;
pub use address::*;

mod blob;
pub use blob::*;

mod decoder;
pub use decoder::*;

pub mod legacy;
pub use legacy::{LEGACY_ADDRESS_FIELDS, LEGACY_BINARY_FIELDS, LEGACY_FIELD_SET_VERSION};

pub mod model;
pub use model::*;

mod value;
pub use value::*;
