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

//! AVMDBG Common - Shared functionality for AVMDBG components
//!
//! This crate provides the building blocks used by the engine crate and by hosts embedding it:
//! content-addressed maps, paging helpers, path normalization, the file access abstraction and
//! logging setup.

/// Map keyed by byte sequences compared by content
pub mod byte_map;
/// Environment variable names used for configuration
pub mod env;
/// File access abstraction and its local and in-memory implementations
pub mod fs;
/// Logging setup and utilities for consistent logging across AVMDBG components
pub mod logging;
/// Host-aware path normalization and resolution
pub mod path;
/// Text decoding helpers
pub mod text;
/// Bounds-safe slice windows for paged listings
pub mod window;

pub use byte_map::*;
pub use fs::*;
pub use path::*;
pub use text::*;
pub use window::*;
