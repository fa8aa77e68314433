use thiserror::Error;

use crate::model::{BusId, ParticipantId};

/// Failure of an ingestion attempt as a whole. Individual malformed rows
/// are skipped by the source, never surfaced here.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("ingestion source unreachable: {0}")]
    Unreachable(String),
    #[error("ingestion source answered with status {0}")]
    Status(u16),
    #[error("ingestion timed out after {0}s")]
    Timeout(u64),
    #[error("ingestion source produced no data rows")]
    Empty,
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("unknown participant {0}")]
    ParticipantNotFound(ParticipantId),
    #[error("unknown bus {0}")]
    BusNotFound(BusId),
    #[error("{actor} is not permitted to manage bus {bus}")]
    BusNotPermitted { bus: BusId, actor: String },
    #[error("ingestion failed: {0}")]
    Ingestion(#[from] IngestError),
}
