use std::time::Duration;

use async_trait::async_trait;
use caravan_roster::{
    Actor, Bus, BusId, IngestError, IngestionSource, Participant, ParticipantId, RosterError,
    RosterService, ServiceStatus, SyncOutcome, SyncReport,
};

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn fleet() -> Vec<Bus> {
    (1..=2)
        .map(|id| Bus {
            id: BusId(id),
            name: format!("Bus {id}"),
            capacity: 50,
        })
        .collect()
}

struct FixedSource(Vec<Participant>);

#[async_trait]
impl IngestionSource for FixedSource {
    async fn fetch(&self) -> Result<Vec<Participant>, IngestError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "fixed".to_owned()
    }
}

struct FailingSource;

#[async_trait]
impl IngestionSource for FailingSource {
    async fn fetch(&self) -> Result<Vec<Participant>, IngestError> {
        Err(IngestError::Unreachable("connection refused".to_owned()))
    }

    fn describe(&self) -> String {
        "failing".to_owned()
    }
}

struct NeverResolves;

#[async_trait]
impl IngestionSource for NeverResolves {
    async fn fetch(&self) -> Result<Vec<Participant>, IngestError> {
        std::future::pending().await
    }

    fn describe(&self) -> String {
        "stuck".to_owned()
    }
}

fn snapshot() -> Vec<Participant> {
    vec![
        Participant::unassigned("p1001", "Ahmed", "Khalil", "T1234"),
        Participant::unassigned("p1002", "Fatima", "Bennani", "T2000"),
    ]
}

fn service_with(source: Box<dyn IngestionSource>) -> RosterService {
    init_tracing();
    RosterService::new(fleet(), source, Duration::from_secs(5))
}

#[tokio::test]
async fn refresh_replaces_the_whole_collection() {
    let service = service_with(Box::new(FixedSource(snapshot())));
    service.refresh().await.unwrap();
    let admin = Actor::admin("Admin User");
    service
        .assign(&admin, &ParticipantId::new("p1001"), BusId(1))
        .await
        .unwrap();

    service
        .set_source(Box::new(FixedSource(vec![Participant::unassigned(
            "p2001", "Layla", "Mansour", "T9000",
        )])))
        .await;
    let report = service.refresh().await.unwrap();

    assert!(service.participant(&ParticipantId::new("p1001")).await.is_none());
    assert!(service.participant(&ParticipantId::new("p1002")).await.is_none());
    assert!(service.participant(&ParticipantId::new("p2001")).await.is_some());
    assert!(service.participants_on(BusId(1)).await.is_empty());
    assert_eq!(
        report.outcome,
        SyncOutcome::Applied {
            added: 1,
            updated: 0,
            removed: 2
        }
    );
}

#[tokio::test]
async fn failed_refresh_preserves_prior_state() {
    let service = service_with(Box::new(FixedSource(snapshot())));
    service.refresh().await.unwrap();
    let admin = Actor::admin("Admin User");
    service
        .assign(&admin, &ParticipantId::new("p1001"), BusId(1))
        .await
        .unwrap();

    service.set_source(Box::new(FailingSource)).await;
    let error = service.refresh().await.unwrap_err();
    assert!(matches!(
        error,
        RosterError::Ingestion(IngestError::Unreachable(_))
    ));

    // Prior data stays readable, assignment included.
    let kept = service
        .participant(&ParticipantId::new("p1001"))
        .await
        .unwrap();
    assert_eq!(kept.assignment.bus_id(), Some(BusId(1)));
    assert_eq!(kept.assignment.assigned_by(), Some("Admin User"));
    assert!(matches!(service.status().await, ServiceStatus::Errored(_)));
}

#[tokio::test]
async fn stuck_source_times_out() {
    init_tracing();
    let service = RosterService::new(
        fleet(),
        Box::new(NeverResolves),
        Duration::from_millis(50),
    );
    let error = service.refresh().await.unwrap_err();
    assert!(matches!(
        error,
        RosterError::Ingestion(IngestError::Timeout(_))
    ));
    assert!(matches!(service.status().await, ServiceStatus::Errored(_)));
}

#[tokio::test]
async fn controllers_are_scoped_to_their_own_bus() {
    let service = service_with(Box::new(FixedSource(snapshot())));
    service.refresh().await.unwrap();

    let controller = Actor::controller("Ahmed", BusId(1));
    let id = ParticipantId::new("p1001");

    service.assign(&controller, &id, BusId(1)).await.unwrap();
    let denied = service.assign(&controller, &id, BusId(2)).await.unwrap_err();
    assert!(matches!(
        denied,
        RosterError::BusNotPermitted { bus: BusId(2), .. }
    ));
    let denied = service.remove(&controller, &id, BusId(2)).await.unwrap_err();
    assert!(matches!(denied, RosterError::BusNotPermitted { .. }));

    // Admins may manage any bus.
    let admin = Actor::admin("Admin User");
    service.assign(&admin, &id, BusId(2)).await.unwrap();
}

#[tokio::test]
async fn status_starts_idle_and_history_records_every_attempt() {
    let service = service_with(Box::new(FixedSource(snapshot())));
    assert_eq!(service.status().await, ServiceStatus::Idle);

    service.refresh().await.unwrap();
    assert_eq!(service.status().await, ServiceStatus::Ready);

    service.set_source(Box::new(FailingSource)).await;
    let _ = service.refresh().await;

    let history = service.history().await;
    assert_eq!(history.len(), 2);
    // Newest first.
    assert!(!history[0].succeeded());
    assert!(history[1].succeeded());
    assert_eq!(history[1].source, "fixed");
}

#[tokio::test]
async fn history_is_bounded_and_evicts_oldest_first() {
    let service = service_with(Box::new(FailingSource));
    for _ in 0..5 {
        let _ = service.refresh().await;
    }
    service.set_source(Box::new(FixedSource(snapshot()))).await;
    for _ in 0..50 {
        service.refresh().await.unwrap();
    }

    // 55 attempts, but only the newest 50 survive: the 5 early failures
    // have been evicted.
    let history = service.history().await;
    assert_eq!(history.len(), 50);
    assert!(history.iter().all(SyncReport::succeeded));
}

#[tokio::test]
async fn reads_remain_consistent_while_a_refresh_is_in_flight() {
    let service = std::sync::Arc::new(service_with(Box::new(FixedSource(snapshot()))));
    service.refresh().await.unwrap();

    service.set_source(Box::new(NeverResolves)).await;
    let background = {
        let service = std::sync::Arc::clone(&service);
        tokio::spawn(async move { service.refresh().await })
    };

    // The stuck ingestion must not block or tear reads of the prior
    // snapshot.
    assert_eq!(service.search("ahmed").await.len(), 1);
    assert_eq!(service.occupancy().await.len(), 2);

    background.abort();
}
