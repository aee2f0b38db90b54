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

//! Path helpers shared by file accessors and the source registry.
//!
//! Paths are kept as text: they come from JSON manifests and source maps, and on
//! case-insensitive hosts they are folded to lowercase, which `Path` has no notion of.

/// Normalize a path for the host's path-casing rules.
///
/// On a case-insensitive host every `/` becomes `\` and the path is lowercased. Otherwise
/// every `\` becomes `/`.
pub fn normalize_path_and_casing(case_insensitive: bool, path: &str) -> String {
    if case_insensitive {
        path.replace('/', "\\").to_lowercase()
    } else {
        path.replace('\\', "/")
    }
}

/// Whether `path` is absolute on either a unix-like or a windows-like host.
pub fn is_absolute_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Resolve `relative_path` against the directory containing `from_file`.
///
/// Absolute paths are returned unchanged. Both separators are recognized in `from_file`.
/// No `..` folding is done.
pub fn resolve_relative_to_file(from_file: &str, relative_path: &str) -> String {
    if is_absolute_path(relative_path) {
        return relative_path.to_string();
    }
    match from_file.rfind(['/', '\\']) {
        Some(idx) => format!("{}/{}", &from_file[..idx], relative_path),
        None => relative_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_sensitive_host() {
        assert_eq!(normalize_path_and_casing(false, "a\\B\\c.teal"), "a/B/c.teal");
        assert_eq!(normalize_path_and_casing(false, "/x/Y.map"), "/x/Y.map");
    }

    #[test]
    fn test_normalize_case_insensitive_host() {
        assert_eq!(normalize_path_and_casing(true, "C:/Work/App.teal"), "c:\\work\\app.teal");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative_to_file("/data/sources.json", "a.map"), "/data/a.map");
        assert_eq!(resolve_relative_to_file("c:\\data\\x.json", "a.map"), "c:\\data/a.map");
        assert_eq!(resolve_relative_to_file("sources.json", "maps/a.map"), "maps/a.map");
        assert_eq!(resolve_relative_to_file("", "a.map"), "a.map");
        assert_eq!(resolve_relative_to_file("/data/sources.json", "/abs/a.map"), "/abs/a.map");
        assert_eq!(resolve_relative_to_file("/data/sources.json", "D:\\a.map"), "D:\\a.map");
    }
}
