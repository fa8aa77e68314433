use async_trait::async_trait;
use caravan_roster::{IngestError, IngestionSource, Participant};
use chrono::Utc;
use tracing::debug;

use crate::csv::parse_export;

/// Ingestion source backed by the Google Sheets CSV export endpoint.
pub struct SheetCsvSource {
    client: reqwest::Client,
    url: String,
}

impl SheetCsvSource {
    /// Builds the source from a sheet id, using the `gviz` CSV export URL.
    pub fn new(sheet_id: &str) -> Self {
        Self::from_url(format!(
            "https://docs.google.com/spreadsheets/d/{sheet_id}/gviz/tq?tqx=out:csv"
        ))
    }

    /// Builds the source from a fully formed export URL.
    pub fn from_url(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl IngestionSource for SheetCsvSource {
    async fn fetch(&self) -> Result<Vec<Participant>, IngestError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|error| IngestError::Unreachable(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|error| IngestError::Unreachable(error.to_string()))?;

        let participants = parse_export(&body, Utc::now());
        debug!(count = participants.len(), url = %self.url, "sheet export fetched");
        if participants.is_empty() {
            return Err(IngestError::Empty);
        }
        Ok(participants)
    }

    fn describe(&self) -> String {
        format!("sheet export {}", self.url)
    }
}
