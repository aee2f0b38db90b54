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

//! Environment variable name constants for AVMDBG configuration.
//!
//! # Environment Variables
//!
//! - [`AVMDBG_LOG_DIR`] - Overrides where log files are written
//! - [`AVMDBG_HOST_CASE_INSENSITIVE`] - Overrides host path-casing detection

/// Environment variable for specifying the log directory.
///
/// When file logging is enabled through [`crate::logging::init_logging`], log files are
/// written to `<AVMDBG_LOG_DIR>/<component>/`.
///
/// # Default
///
/// When not set, logs go to `<system temp dir>/avmdbg-logs/<component>/`.
///
/// # Examples
///
/// ```bash
/// AVMDBG_LOG_DIR=/tmp/avmdbg-logs cargo run
/// ```
pub const AVMDBG_LOG_DIR: &str = "AVMDBG_LOG_DIR";

/// Environment variable for forcing the host path-casing rules.
///
/// Source maps and manifests are often produced on one platform and debugged on another. Setting
/// this variable makes [`crate::fs::LocalFileAccessor::from_env`] treat paths as
/// case-insensitive and backslash separated (`1` or `true`) or case-sensitive and slash
/// separated (`0` or `false`).
///
/// # Default
///
/// When not set or set to any other value, the rules of the compilation target are used.
pub const AVMDBG_HOST_CASE_INSENSITIVE: &str = "AVMDBG_HOST_CASE_INSENSITIVE";
