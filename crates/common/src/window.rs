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

//! Bounds-safe windows over slices, used to page large stack and variable listings.

/// Return `count` items of `items` starting at `start`, clamped to the slice.
///
/// `start` defaults to 0 and `count` to the rest of the slice. A negative `start` or `count`
/// is treated as 0, a `start` at or past the end yields an empty window, and a window running
/// past the end is shortened. This never panics.
pub fn window<T>(items: &[T], start: Option<i64>, count: Option<i64>) -> &[T] {
    let len = items.len();
    let start = start.unwrap_or(0).max(0);
    let count = count.map_or(len as u64, |count| count.max(0) as u64);

    let start = match usize::try_from(start) {
        Ok(start) if start < len => start,
        _ => return &[],
    };
    let end = start.saturating_add(usize::try_from(count).unwrap_or(usize::MAX)).min(len);
    &items[start..end]
}
