use std::sync::Arc;

use chrono::{DateTime, Utc};
use sheetview_core::{
    partition_layout, DataStatistics, FetchLifecycleTracker, FetchMetadata, FetchResult,
    SheetConfig, SheetError, Snapshot,
};
use tokio::sync::RwLock;

use crate::client::SpreadsheetClient;

#[derive(Default)]
struct ServiceState {
    tracker: FetchLifecycleTracker,
    snapshot: Snapshot,
}

impl ServiceState {
    fn replace_snapshot(&mut self, snapshot: Snapshot) {
        if let Some(metadata) = &snapshot.metadata {
            self.tracker.record_fetch(metadata.fetched_at);
        }
        self.snapshot = snapshot;
    }
}

/// Fetches the sheet partitions through a [`SpreadsheetClient`] and keeps
/// the latest snapshot.
///
/// The state lock is never held across the network call, so overlapping
/// fetches are last-write-wins. A failed fetch leaves the previous snapshot
/// and initialization state untouched.
pub struct SheetDataService {
    client: Arc<dyn SpreadsheetClient>,
    state: RwLock<ServiceState>,
}

impl SheetDataService {
    pub fn new(client: Arc<dyn SpreadsheetClient>) -> Self {
        Self {
            client,
            state: RwLock::new(ServiceState::default()),
        }
    }

    /// Fetch all partitions and record `spreadsheet_id`/`sheet_name` as the
    /// service configuration. Never fails: errors come back as
    /// [`FetchResult::Failure`].
    pub async fn initialize_and_fetch(&self, spreadsheet_id: &str, sheet_name: &str) -> FetchResult {
        match self.try_initialize(spreadsheet_id, sheet_name).await {
            Ok(snapshot) => FetchResult::Success { data: snapshot },
            Err(e) => {
                tracing::warn!("Initial fetch of {} failed: {}", spreadsheet_id, e);
                FetchResult::Failure {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_initialize(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> Result<Snapshot, SheetError> {
        let config = SheetConfig::new(spreadsheet_id, sheet_name)?;
        let snapshot = self.fetch_snapshot(&config).await?;

        let mut state = self.state.write().await;
        state.replace_snapshot(snapshot.clone());
        state.tracker.mark_initialized(config);

        Ok(snapshot)
    }

    /// Refresh using the stored spreadsheet id and the given sheet.
    ///
    /// Fails with [`SheetError::NotInitialized`] until
    /// [`initialize_and_fetch`](Self::initialize_and_fetch) has succeeded once.
    /// The stored configuration is left as it was.
    pub async fn fetch_default_data(&self, sheet_name: &str) -> Result<Snapshot, SheetError> {
        let spreadsheet_id = {
            let state = self.state.read().await;
            state
                .tracker
                .config()
                .map(|config| config.spreadsheet_id.clone())
                .ok_or(SheetError::NotInitialized)?
        };

        let config = SheetConfig::new(spreadsheet_id, sheet_name)?;
        let snapshot = self.fetch_snapshot(&config).await.inspect_err(|e| {
            tracing::warn!("Refresh of {} failed: {}", config.spreadsheet_id, e);
        })?;

        self.state.write().await.replace_snapshot(snapshot.clone());
        Ok(snapshot)
    }

    pub async fn initialization_status(&self) -> bool {
        self.state.read().await.tracker.is_initialized()
    }

    /// Counts for `snapshot`, or `None` if it has not been fetched
    pub fn data_statistics(&self, snapshot: &Snapshot) -> Option<DataStatistics> {
        FetchLifecycleTracker::statistics_for(snapshot)
    }

    /// The most recent successfully fetched snapshot
    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.snapshot.clone()
    }

    /// When data was last fetched successfully
    pub async fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.tracker.last_fetched_at()
    }

    /// Configuration recorded by the last successful initialization
    pub async fn config(&self) -> Option<SheetConfig> {
        self.state.read().await.tracker.config().cloned()
    }

    async fn fetch_snapshot(&self, config: &SheetConfig) -> Result<Snapshot, SheetError> {
        let layout = partition_layout(&config.sheet_name);
        let range_keys: Vec<String> = layout.iter().map(|spec| spec.range_key.clone()).collect();

        let batch = self
            .client
            .get_batch_data(&config.spreadsheet_id, &range_keys)
            .await
            .map_err(|e| SheetError::Transport(e.to_string()))?;

        let metadata = FetchMetadata::now(&config.spreadsheet_id, &config.sheet_name);
        let snapshot = Snapshot::from_batch(&layout, &batch, metadata);

        tracing::info!(
            "Fetched {}!{}: {} normals, {} newbies, {} leaders, {} pairs",
            config.spreadsheet_id,
            config.sheet_name,
            snapshot.normals.len(),
            snapshot.newbies.len(),
            snapshot.leaders.len(),
            snapshot.filter_pairs.len()
        );

        Ok(snapshot)
    }
}
