//! Conversion of raw range values into clean application collections.
//!
//! Raw grids are ragged: rows may be shorter than the requested range and
//! cells may be missing. Nothing here fails; malformed input simply yields
//! fewer items.

use std::collections::HashMap;

/// A single cell as returned by the transport; `None` for an empty/null cell
pub type RawCell = Option<String>;

/// One row of a raw grid, possibly shorter than the requested range
pub type RawRow = Vec<RawCell>;

/// Raw values for one range, row-major
pub type RawGrid = Vec<RawRow>;

/// Result of one batch read, keyed by the requested range string.
/// A missing key means the range returned no data.
pub type BatchValues = HashMap<String, RawGrid>;

/// Flatten a grid into trimmed, non-blank values in row-major order.
/// Duplicates are kept.
pub fn to_list(grid: Option<&RawGrid>) -> Vec<String> {
    let Some(grid) = grid else {
        return Vec::new();
    };

    grid.iter()
        .flatten()
        .filter_map(|cell| cell.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep rows whose first two cells are present and non-empty, as pairs.
/// Values are taken as-is, without trimming.
pub fn to_pair_list(grid: Option<&RawGrid>) -> Vec<(String, String)> {
    let Some(grid) = grid else {
        return Vec::new();
    };

    grid.iter()
        .filter_map(|row| match row.as_slice() {
            [Some(first), Some(second), ..] if !first.is_empty() && !second.is_empty() => {
                Some((first.clone(), second.clone()))
            }
            _ => None,
        })
        .collect()
}
