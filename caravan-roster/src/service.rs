use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{IngestError, RosterError};
use crate::model::{Bus, BusId, BusOccupancy, Participant, ParticipantId};
use crate::source::IngestionSource;
use crate::store::RosterStore;
use crate::sync::{diff_snapshots, SyncOutcome, SyncReport};

/// Refresh attempts kept in the in-memory history.
const HISTORY_LIMIT: usize = 50;

/// The acting identity a mutation is attributed to and scoped by. Admins
/// may manage every bus; controllers exactly one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub scope: ActorScope,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorScope {
    AllBuses,
    Bus(BusId),
}

impl Actor {
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: ActorScope::AllBuses,
        }
    }

    pub fn controller(name: impl Into<String>, bus: BusId) -> Self {
        Self {
            name: name.into(),
            scope: ActorScope::Bus(bus),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceStatus {
    /// No ingestion has run yet.
    Idle,
    Ready,
    /// The last refresh failed; the previously ingested data stays
    /// readable.
    Errored(String),
}

/// Async façade over [`RosterStore`]: the one component that owns roster
/// state for a session. Reads stay consistent while a refresh is in
/// flight because the fetch runs before a short write-locked swap;
/// mutations are serialized by the write lock.
pub struct RosterService {
    store: RwLock<RosterStore>,
    source: RwLock<Box<dyn IngestionSource>>,
    status: Mutex<ServiceStatus>,
    history: Mutex<Vec<SyncReport>>,
    fetch_timeout: Duration,
}

impl RosterService {
    pub fn new(
        buses: Vec<Bus>,
        source: Box<dyn IngestionSource>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store: RwLock::new(RosterStore::new(buses)),
            source: RwLock::new(source),
            status: Mutex::new(ServiceStatus::Idle),
            history: Mutex::new(Vec::new()),
            fetch_timeout,
        }
    }

    /// Replaces the participant collection from the current ingestion
    /// source. The fetch is bounded by the configured timeout; on any
    /// failure the prior state is left exactly as it was and the service
    /// reports [`ServiceStatus::Errored`]. Every attempt is recorded as a
    /// [`SyncReport`].
    pub async fn refresh(&self) -> Result<SyncReport, RosterError> {
        let started = Instant::now();
        let at = Utc::now();

        let source = self.source.read().await;
        let label = source.describe();
        let fetched = match timeout(self.fetch_timeout, source.fetch()).await {
            Ok(result) => result,
            Err(_elapsed) => Err(IngestError::Timeout(self.fetch_timeout.as_secs())),
        };
        drop(source);

        match fetched {
            Ok(snapshot) => {
                let mut store = self.store.write().await;
                let (added, updated, removed) =
                    diff_snapshots(store.participants(), &snapshot);
                store.replace_all(snapshot);
                drop(store);

                *self.status.lock().await = ServiceStatus::Ready;
                info!(source = %label, added, updated, removed, "roster refreshed");
                let report = SyncReport {
                    at,
                    duration: started.elapsed(),
                    source: label,
                    outcome: SyncOutcome::Applied {
                        added,
                        updated,
                        removed,
                    },
                };
                self.push_history(report.clone()).await;
                Ok(report)
            }
            Err(error) => {
                *self.status.lock().await = ServiceStatus::Errored(error.to_string());
                warn!(source = %label, %error, "roster refresh failed, keeping prior state");
                self.push_history(SyncReport {
                    at,
                    duration: started.elapsed(),
                    source: label,
                    outcome: SyncOutcome::Failed {
                        error: error.to_string(),
                    },
                })
                .await;
                Err(RosterError::Ingestion(error))
            }
        }
    }

    /// Assigns a participant on behalf of `actor`, recording the actor's
    /// name as the attribution. Controllers may only assign onto their own
    /// bus; this mirrors the presentation-layer scoping as a second line
    /// of defense.
    pub async fn assign(
        &self,
        actor: &Actor,
        id: &ParticipantId,
        bus_id: BusId,
    ) -> Result<Participant, RosterError> {
        Self::check_scope(actor, bus_id)?;
        self.store.write().await.assign(id, bus_id, &actor.name)
    }

    pub async fn remove(
        &self,
        actor: &Actor,
        id: &ParticipantId,
        bus_id: BusId,
    ) -> Result<Participant, RosterError> {
        Self::check_scope(actor, bus_id)?;
        self.store.write().await.remove(id, bus_id)
    }

    pub async fn search(&self, query: &str) -> Vec<Participant> {
        self.store.read().await.search(query)
    }

    pub async fn participants_on(&self, bus_id: BusId) -> Vec<Participant> {
        self.store.read().await.participants_on(bus_id)
    }

    pub async fn occupancy(&self) -> Vec<BusOccupancy> {
        self.store.read().await.occupancy()
    }

    pub async fn participant(&self, id: &ParticipantId) -> Option<Participant> {
        self.store.read().await.participant(id).cloned()
    }

    pub async fn buses(&self) -> Vec<Bus> {
        self.store.read().await.buses().to_vec()
    }

    pub async fn status(&self) -> ServiceStatus {
        self.status.lock().await.clone()
    }

    /// Most recent refresh attempts, newest first.
    pub async fn history(&self) -> Vec<SyncReport> {
        self.history.lock().await.iter().rev().cloned().collect()
    }

    /// Swaps the ingestion source; takes effect on the next refresh. This
    /// backs the admin "change spreadsheet" flow.
    pub async fn set_source(&self, source: Box<dyn IngestionSource>) {
        let mut current = self.source.write().await;
        info!(from = %current.describe(), to = %source.describe(), "ingestion source changed");
        *current = source;
    }

    fn check_scope(actor: &Actor, bus_id: BusId) -> Result<(), RosterError> {
        match actor.scope {
            ActorScope::AllBuses => Ok(()),
            ActorScope::Bus(own) if own == bus_id => Ok(()),
            ActorScope::Bus(_) => Err(RosterError::BusNotPermitted {
                bus: bus_id,
                actor: actor.name.clone(),
            }),
        }
    }

    async fn push_history(&self, report: SyncReport) {
        let mut history = self.history.lock().await;
        history.push(report);
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }
    }
}
