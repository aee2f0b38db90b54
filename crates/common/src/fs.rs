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

//! File access abstraction.
//!
//! The decoder and the source registry never touch the filesystem directly. They read through a
//! [`FileAccessor`], which a host supplies: [`LocalFileAccessor`] for the real filesystem and
//! [`InMemoryFileAccessor`] for embedding and tests.

use std::{collections::HashMap, future::Future, io, sync::Arc};

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::{env::AVMDBG_HOST_CASE_INSENSITIVE, path::resolve_relative_to_file};

/// Asynchronous access to files by textual path.
pub trait FileAccessor: Send + Sync {
    /// Whether the host treats paths case-insensitively (backslash separated).
    fn is_host_case_insensitive(&self) -> bool;

    /// Read the whole file at `path`.
    fn read_file(&self, path: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Replace the contents of the file at `path`.
    fn write_file(&self, path: &str, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Resolve `relative_path` against the directory holding `from_file`.
    fn resolve_relative_path(&self, from_file: &str, relative_path: &str) -> String {
        resolve_relative_to_file(from_file, relative_path)
    }
}

/// [`FileAccessor`] backed by the local filesystem through `tokio::fs`.
#[derive(Debug, Clone)]
pub struct LocalFileAccessor {
    case_insensitive: bool,
}

impl Default for LocalFileAccessor {
    fn default() -> Self {
        Self { case_insensitive: cfg!(windows) }
    }
}

impl LocalFileAccessor {
    /// Accessor using the platform's casing rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor with explicit casing rules.
    pub fn with_case_insensitivity(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// Accessor honoring [`AVMDBG_HOST_CASE_INSENSITIVE`] when it is set to a boolean.
    pub fn from_env() -> Self {
        match std::env::var(AVMDBG_HOST_CASE_INSENSITIVE).ok().as_deref().map(str::trim) {
            Some("1" | "true") => Self::with_case_insensitivity(true),
            Some("0" | "false") => Self::with_case_insensitivity(false),
            _ => Self::default(),
        }
    }
}

impl FileAccessor for LocalFileAccessor {
    fn is_host_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    fn read_file(&self, path: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        let path = path.to_owned();
        async move {
            trace!("reading file: {path}");
            tokio::fs::read(path).await
        }
    }

    fn write_file(&self, path: &str, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send {
        let path = path.to_owned();
        let contents = contents.to_vec();
        async move {
            trace!("writing file: {path}");
            tokio::fs::write(path, contents).await
        }
    }
}

/// [`FileAccessor`] over an in-memory file table.
///
/// Every read attempt is recorded, including failed ones, so callers can check which files a
/// load touched.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFileAccessor {
    case_insensitive: bool,
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    reads: Arc<Mutex<Vec<String>>>,
}

impl InMemoryFileAccessor {
    /// Empty, case-sensitive file table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty file table with explicit casing rules.
    pub fn with_case_insensitivity(case_insensitive: bool) -> Self {
        Self { case_insensitive, ..Default::default() }
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), contents.into());
    }

    /// Builder form of [`Self::insert`].
    pub fn with_file(self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Current contents of a file.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().get(path).cloned()
    }

    /// Every path passed to `read_file`, in call order.
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }
}

impl FileAccessor for InMemoryFileAccessor {
    fn is_host_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    fn read_file(&self, path: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        self.reads.lock().push(path.to_owned());
        let result = self.files.read().get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("ENOENT: no such file or directory, open '{path}'"),
            )
        });
        async move { result }
    }

    fn write_file(&self, path: &str, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send {
        self.insert(path, contents);
        async { Ok(()) }
    }
}
