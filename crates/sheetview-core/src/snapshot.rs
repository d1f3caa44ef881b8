use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::{to_list, to_pair_list, BatchValues};
use crate::range::{Partition, RangeSpec};

/// Where and when a snapshot was fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMetadata {
    pub fetched_at: DateTime<Utc>,
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

impl FetchMetadata {
    /// Metadata stamped with the current time
    pub fn now(spreadsheet_id: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            fetched_at: Utc::now(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        }
    }
}

/// A complete normalized view of every partition.
///
/// The default value is the empty snapshot held before any fetch completes;
/// its metadata is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub normals: Vec<String>,
    pub newbies: Vec<String>,
    pub leaders: Vec<String>,
    pub filter_pairs: Vec<(String, String)>,
    pub metadata: Option<FetchMetadata>,
}

impl Snapshot {
    /// Normalize a batch result according to `layout`.
    /// Each spec is read the way its partition requires; ranges missing from
    /// `batch` become empty partitions.
    pub fn from_batch(layout: &[RangeSpec], batch: &BatchValues, metadata: FetchMetadata) -> Self {
        let mut snapshot = Snapshot {
            metadata: Some(metadata),
            ..Default::default()
        };

        for spec in layout {
            let grid = batch.get(&spec.range_key);
            match spec.partition {
                Partition::Normals => snapshot.normals = to_list(grid),
                Partition::Newbies => snapshot.newbies = to_list(grid),
                Partition::Leaders => snapshot.leaders = to_list(grid),
                Partition::FilterPairs => snapshot.filter_pairs = to_pair_list(grid),
            }
        }

        snapshot
    }

    /// Whether a fetch has populated this snapshot
    pub fn is_fetched(&self) -> bool {
        self.metadata.is_some()
    }

    /// Serialize to pretty JSON, for inspecting the raw normalized data
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Outcome of an initializing fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchResult {
    Success { data: Snapshot },
    Failure { error: String },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// The fetched snapshot, if the fetch succeeded
    pub fn data(&self) -> Option<&Snapshot> {
        match self {
            FetchResult::Success { data } => Some(data),
            FetchResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::Failure { error } => Some(error),
        }
    }
}
