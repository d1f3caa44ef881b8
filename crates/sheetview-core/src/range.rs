use serde::{Deserialize, Serialize};
use std::fmt;

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: u32) -> String {
    let mut label = String::new();
    let mut n = u64::from(col) + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// A rectangular A1 region. Rows are 1-indexed as written in A1 notation;
/// a missing end row reads to the bottom of the sheet (e.g. `A4:A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRegion {
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: Option<u32>,
}

impl SheetRegion {
    /// A single column from `start_row` down to the last populated row
    pub const fn column(col: u32, start_row: u32) -> Self {
        SheetRegion {
            start_col: col,
            start_row,
            end_col: col,
            end_row: None,
        }
    }

    pub const fn bounded(start_col: u32, start_row: u32, end_col: u32, end_row: u32) -> Self {
        SheetRegion {
            start_col,
            start_row,
            end_col,
            end_row: Some(end_row),
        }
    }

    /// Number of columns covered by the region, whichever way round the
    /// columns are given
    pub fn col_count(&self) -> u32 {
        self.end_col.abs_diff(self.start_col).saturating_add(1)
    }

    /// Convert to A1:B1 notation
    pub fn to_a1(&self) -> String {
        let start = format!("{}{}", col_to_label(self.start_col), self.start_row);
        match self.end_row {
            Some(row) => format!("{}:{}{}", start, col_to_label(self.end_col), row),
            None => format!("{}:{}", start, col_to_label(self.end_col)),
        }
    }
}

impl fmt::Display for SheetRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// How the cells of a range are turned into application data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeRole {
    /// Every non-blank cell becomes one list item
    List,
    /// The first two cells of each row form a pair
    Pair,
}

/// The four logical groups read from the sheet
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Partition {
    Normals,
    Newbies,
    Leaders,
    FilterPairs,
}

impl Partition {
    /// All partitions, in fetch order
    pub const ALL: [Partition; 4] = [
        Partition::Normals,
        Partition::Newbies,
        Partition::Leaders,
        Partition::FilterPairs,
    ];

    pub fn role(&self) -> RangeRole {
        match self {
            Partition::FilterPairs => RangeRole::Pair,
            _ => RangeRole::List,
        }
    }

    /// Cell region this partition occupies on the sheet
    pub fn region(&self) -> SheetRegion {
        match self {
            Partition::Normals => SheetRegion::column(0, 4),
            Partition::Newbies => SheetRegion::column(1, 4),
            Partition::Leaders => SheetRegion::column(2, 4),
            Partition::FilterPairs => SheetRegion::bounded(6, 4, 7, 40),
        }
    }
}

/// One range to request in a batch read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub partition: Partition,
    /// Key used both in the request and in the batch result, e.g. `DB!A4:A`
    pub range_key: String,
    pub role: RangeRole,
}

impl RangeSpec {
    pub fn new(sheet_name: &str, partition: Partition) -> Self {
        RangeSpec {
            partition,
            range_key: format!("{}!{}", sheet_name, partition.region()),
            role: partition.role(),
        }
    }
}

/// Build the range specs for every partition of `sheet_name`, in fetch order
pub fn partition_layout(sheet_name: &str) -> [RangeSpec; 4] {
    Partition::ALL.map(|partition| RangeSpec::new(sheet_name, partition))
}
