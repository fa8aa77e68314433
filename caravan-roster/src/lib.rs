pub mod error;
pub mod model;
pub mod service;
pub mod source;
pub mod store;
pub mod sync;

pub use error::{IngestError, RosterError};
pub use model::{Assignment, Bus, BusId, BusOccupancy, Participant, ParticipantId};
pub use service::{Actor, ActorScope, RosterService, ServiceStatus};
pub use source::IngestionSource;
pub use store::RosterStore;
pub use sync::{SyncOutcome, SyncReport};
