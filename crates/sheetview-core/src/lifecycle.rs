use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SheetError;
use crate::snapshot::Snapshot;

/// The spreadsheet and sheet a service reads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

impl SheetConfig {
    /// Create a config, rejecting blank ids or sheet names. Spreadsheet ids
    /// may only contain ASCII letters, digits, `-` and `_`.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Result<Self, SheetError> {
        let spreadsheet_id = spreadsheet_id.into();
        let sheet_name = sheet_name.into();

        if spreadsheet_id.trim().is_empty() {
            return Err(SheetError::Config("spreadsheet id is empty".to_string()));
        }
        if !spreadsheet_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SheetError::Config(format!(
                "spreadsheet id contains invalid characters: {:?}",
                spreadsheet_id
            )));
        }
        if sheet_name.trim().is_empty() {
            return Err(SheetError::Config("sheet name is empty".to_string()));
        }

        Ok(Self {
            spreadsheet_id,
            sheet_name,
        })
    }
}

/// Item counts derived from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStatistics {
    /// Normals, newbies and leaders combined
    pub total_items: usize,
    pub total_pairs: usize,
}

/// Tracks whether a first successful fetch has happened, with which config,
/// and when data was last fetched successfully
#[derive(Debug, Clone, Default)]
pub struct FetchLifecycleTracker {
    initialized: bool,
    config: Option<SheetConfig>,
    last_fetched_at: Option<DateTime<Utc>>,
}

impl FetchLifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful initialization. Later calls overwrite the config.
    pub fn mark_initialized(&mut self, config: SheetConfig) {
        self.config = Some(config);
        self.initialized = true;
    }

    /// Record a successful fetch, initializing or refreshing
    pub fn record_fetch(&mut self, fetched_at: DateTime<Utc>) {
        self.last_fetched_at = Some(fetched_at);
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Config recorded by the last successful initialization
    pub fn config(&self) -> Option<&SheetConfig> {
        self.config.as_ref()
    }

    /// Counts for a snapshot; `None` until that snapshot has been fetched
    pub fn statistics_for(snapshot: &Snapshot) -> Option<DataStatistics> {
        snapshot.metadata.as_ref()?;

        Some(DataStatistics {
            total_items: snapshot.normals.len() + snapshot.newbies.len() + snapshot.leaders.len(),
            total_pairs: snapshot.filter_pairs.len(),
        })
    }
}
