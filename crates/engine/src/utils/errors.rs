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

//! Errors raised while loading debugging assets.

use std::io;

use thiserror::Error;

/// The root cause category of a [`DecodeError`], ignoring any path prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Bytes are not valid text or structured data, or do not match the expected shape.
    MalformedInput,
    /// The simulate response declares a version other than the supported one.
    UnsupportedVersion,
    /// The simulate response was produced without execution tracing.
    TracingNotEnabled,
    /// The program sources manifest failed structural validation.
    ManifestShapeInvalid,
    /// A file could not be read.
    IoFailure,
}

/// Errors that can occur while decoding traces, manifests and source maps.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input is not valid UTF-8, not valid JSON, or does not fit the expected model
    #[error("{0}")]
    MalformedInput(String),

    /// Version other than [`crate::SUPPORTED_SIMULATE_RESPONSE_VERSION`]
    #[error("Unsupported simulate response version: {0}")]
    UnsupportedVersion(String),

    /// `exec-trace-config` is absent or not enabled; carries its JSON form or `undefined`
    #[error("Simulate response does not contain trace data. execTraceConfig={0}")]
    TracingNotEnabled(String),

    /// Every problem found in a program sources manifest
    #[error("Could not parse program sources description {origin}: {}", problems.join("; "))]
    ManifestShapeInvalid {
        /// `file from '<path>'` or `content`
        origin: String,
        /// One message per offending field or entry
        problems: Vec<String>,
    },

    /// A file read failed
    #[error("{context}: {source}")]
    Io {
        /// What was being read
        context: String,
        /// The host error
        #[source]
        source: io::Error,
    },

    /// Another error prefixed with the artifact it concerns
    #[error("{context}: {source}")]
    Context {
        /// Human-readable prefix, usually naming a file
        context: String,
        /// The wrapped cause
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Build a [`DecodeError::MalformedInput`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Build a [`DecodeError::Io`].
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Prefix this error with `context`, keeping it as the source.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context { context: context.into(), source: Box::new(self) }
    }

    /// The root cause category.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::MalformedInput(_) => DecodeErrorKind::MalformedInput,
            Self::UnsupportedVersion(_) => DecodeErrorKind::UnsupportedVersion,
            Self::TracingNotEnabled(_) => DecodeErrorKind::TracingNotEnabled,
            Self::ManifestShapeInvalid { .. } => DecodeErrorKind::ManifestShapeInvalid,
            Self::Io { .. } => DecodeErrorKind::IoFailure,
            Self::Context { source, .. } => source.kind(),
        }
    }
}

/// Attach a context prefix to the error of a result.
pub trait DecodeResultExt<T> {
    /// Prefix the error, if any, with `context`.
    fn with_decode_context<F, S>(self, context: F) -> Result<T, DecodeError>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> DecodeResultExt<T> for Result<T, DecodeError> {
    fn with_decode_context<F, S>(self, context: F) -> Result<T, DecodeError>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|err| err.context(context()))
    }
}
