use std::sync::Mutex;

use async_trait::async_trait;
use sheetview_core::{BatchValues, RawGrid};

use crate::client::{ClientError, SpreadsheetClient};

/// In-memory client that answers every batch with a preset response
pub struct ScriptedClient {
    response: Mutex<Result<BatchValues, String>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedClient {
    pub fn new(batch: BatchValues) -> Self {
        Self {
            response: Mutex::new(Ok(batch)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        let client = Self::new(BatchValues::new());
        client.fail_with(message);
        client
    }

    pub fn respond_with(&self, batch: BatchValues) {
        *self.response.lock().unwrap() = Ok(batch);
    }

    pub fn fail_with(&self, message: &str) {
        *self.response.lock().unwrap() = Err(message.to_string());
    }

    /// Spreadsheet id and range keys of every call so far
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpreadsheetClient for ScriptedClient {
    async fn get_batch_data(
        &self,
        spreadsheet_id: &str,
        range_keys: &[String],
    ) -> Result<BatchValues, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((spreadsheet_id.to_string(), range_keys.to_vec()));

        match &*self.response.lock().unwrap() {
            Ok(batch) => Ok(batch.clone()),
            Err(message) => Err(ClientError::Api {
                status: 500,
                message: message.clone(),
            }),
        }
    }
}

fn grid(rows: &[&[&str]]) -> RawGrid {
    rows.iter()
        .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
        .collect()
}

/// A batch covering every partition of `sheet_name`, with some blank cells
pub fn sample_batch(sheet_name: &str) -> BatchValues {
    let mut batch = BatchValues::new();
    batch.insert(
        format!("{}!A4:A", sheet_name),
        grid(&[&["alice"], &["  "], &[""], &["bob"]]),
    );
    batch.insert(format!("{}!B4:B", sheet_name), grid(&[&["nina"]]));
    batch.insert(format!("{}!C4:C", sheet_name), grid(&[&[" lee "], &[]]));
    batch.insert(
        format!("{}!G4:H40", sheet_name),
        grid(&[&["g1", "h1"], &["g2"], &["", "h3"], &["g4", "h4"]]),
    );
    batch
}
