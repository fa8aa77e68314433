use async_trait::async_trait;

use crate::error::IngestError;
use crate::model::Participant;

/// Boundary consumed by [`RosterService::refresh`](crate::RosterService):
/// produces a complete participant snapshot. Implementations live in
/// `caravan-ingest`.
///
/// A fetch either yields a full snapshot or fails as a whole; partially
/// parseable input is a source concern (skip the bad rows, keep the rest).
#[async_trait]
pub trait IngestionSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Participant>, IngestError>;

    /// Human-readable label for logs and sync reports.
    fn describe(&self) -> String;
}
