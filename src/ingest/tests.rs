use super::*;
use crate::config::ActorConfig;
use crate::directory::ActorDirectory;
use crate::vehicle::{InitError, VehicleHandle, VehicleId, VehicleMessage};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

const TIMEOUT: Duration = Duration::from_secs(1);

fn setup() -> (Arc<ActorDirectory>, Arc<MetricsTracker>, IngestionRouter) {
    let directory = Arc::new(ActorDirectory::new(&ActorConfig::default()));
    let metrics = Arc::new(MetricsTracker::new());
    let router = IngestionRouter::new(directory.clone(), metrics.clone());
    (directory, metrics, router)
}

/// Resolver that hands out raw mailboxes so tests can inspect what was sent
struct RecordingResolver {
    mailboxes: Mutex<Vec<mpsc::Receiver<VehicleMessage>>>,
    capacity: usize,
}

impl VehicleResolver for RecordingResolver {
    fn resolve(&self, id: &VehicleId) -> Result<VehicleHandle, SpawnError> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.mailboxes.lock().unwrap().push(rx);
        Ok(VehicleHandle::new(id.clone(), tx))
    }
}

/// Resolver that always returns the same handle
struct FixedResolver(VehicleHandle);

impl VehicleResolver for FixedResolver {
    fn resolve(&self, _id: &VehicleId) -> Result<VehicleHandle, SpawnError> {
        Ok(self.0.clone())
    }
}

/// Resolver that refuses every spawn
struct FailingResolver;

impl VehicleResolver for FailingResolver {
    fn resolve(&self, id: &VehicleId) -> Result<VehicleHandle, SpawnError> {
        Err(SpawnError::RetriesExhausted {
            id: id.clone(),
            attempts: 3,
            last_error: InitError::Rejected("test".to_string()),
        })
    }
}

#[tokio::test]
async fn test_valid_event_is_applied() {
    let (directory, metrics, router) = setup();

    let outcome = router.route(&VehicleEvent::new("bus-7", Some(37.7), Some(-122.4)));

    assert_eq!(outcome, RouteOutcome::Applied);
    let latest = directory
        .lookup("bus-7")
        .unwrap()
        .latest_position(TIMEOUT)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((latest.latitude, latest.longitude), (37.7, -122.4));
    assert_eq!(metrics.get_snapshot().events_applied, 1);
}

#[tokio::test]
async fn test_invalid_event_never_creates_actor() {
    let (directory, metrics, router) = setup();

    let outcome = router.route(&VehicleEvent::new("bus-7", Some(37.7), None));

    assert_eq!(
        outcome,
        RouteOutcome::Discarded(ValidationError::MissingLongitude)
    );
    assert!(directory.lookup("bus-7").is_none());
    assert!(directory.is_empty());

    let snapshot = metrics.get_snapshot();
    assert_eq!(snapshot.events_received, 1);
    assert_eq!(snapshot.events_discarded, 1);
    assert_eq!(snapshot.events_applied, 0);
}

#[tokio::test]
async fn test_invalid_event_leaves_existing_state_unchanged() {
    let (directory, _metrics, router) = setup();

    router.route(&VehicleEvent::new("bus-7", Some(37.7), Some(-122.4)));
    router.route(&VehicleEvent::new("bus-7", None, Some(-122.5)));

    let history = directory
        .lookup("bus-7")
        .unwrap()
        .position_history(TIMEOUT)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].longitude, -122.4);
}

#[tokio::test]
async fn test_updates_for_one_vehicle_keep_submission_order() {
    let (directory, _metrics, router) = setup();

    for i in 0..100 {
        router.route(&VehicleEvent::new("bus-7", Some(i as f64), Some(0.0)));
    }

    let history = directory
        .lookup("bus-7")
        .unwrap()
        .position_history(TIMEOUT)
        .await
        .unwrap();
    let latitudes: Vec<f64> = history.iter().map(|p| p.latitude).collect();
    let expected: Vec<f64> = (0..100).map(|i| i as f64).collect();
    assert_eq!(latitudes, expected);
}

#[tokio::test]
async fn test_spawn_failure_drops_event_and_continues() {
    let metrics = Arc::new(MetricsTracker::new());
    let router = IngestionRouter::new(Arc::new(FailingResolver), metrics.clone());

    let first = router.route(&VehicleEvent::new("bus-7", Some(1.0), Some(1.0)));
    let second = router.route(&VehicleEvent::new("bus-8", Some(2.0), Some(2.0)));

    assert!(matches!(first, RouteOutcome::Dropped(DropReason::Spawn(_))));
    assert!(matches!(second, RouteOutcome::Dropped(DropReason::Spawn(_))));
    assert_eq!(metrics.get_snapshot().events_dropped, 2);
}

#[tokio::test]
async fn test_full_mailbox_drops_event_without_blocking() {
    let (tx, _rx) = mpsc::channel(1);
    let handle = VehicleHandle::new(VehicleId::from("bus-7"), tx);
    handle.update_position(0.0, 0.0).unwrap();

    let metrics = Arc::new(MetricsTracker::new());
    let router = IngestionRouter::new(Arc::new(FixedResolver(handle)), metrics.clone());
    let outcome = router.route(&VehicleEvent::new("bus-7", Some(1.0), Some(1.0)));

    assert!(matches!(
        outcome,
        RouteOutcome::Dropped(DropReason::Tell(TellError::MailboxFull { .. }))
    ));
    assert_eq!(metrics.get_snapshot().events_dropped, 1);
}

#[tokio::test]
async fn test_router_sends_update_message() {
    let resolver = Arc::new(RecordingResolver {
        mailboxes: Mutex::new(Vec::new()),
        capacity: 8,
    });
    let router = IngestionRouter::new(resolver.clone(), Arc::new(MetricsTracker::new()));

    router.route(&VehicleEvent::new("bus-7", Some(37.7), Some(-122.4)));

    let mut mailboxes = resolver.mailboxes.lock().unwrap();
    assert_eq!(mailboxes.len(), 1);
    match mailboxes[0].try_recv().unwrap() {
        VehicleMessage::UpdatePosition {
            latitude,
            longitude,
        } => {
            assert_eq!(latitude, 37.7);
            assert_eq!(longitude, -122.4);
        }
        other => panic!("Expected UpdatePosition, got {:?}", other),
    }
}

#[tokio::test]
async fn test_run_drains_stream() {
    let (directory, metrics, router) = setup();

    let events = vec![
        VehicleEvent::new("bus-1", Some(1.0), Some(1.0)),
        VehicleEvent::new("bus-2", Some(2.0), Some(2.0)),
        VehicleEvent::new("bus-3", None, Some(3.0)),
        VehicleEvent::new("bus-1", Some(1.5), Some(1.5)),
    ];

    let count = router.run(tokio_stream::iter(events)).await;

    assert_eq!(count, 4);
    assert_eq!(directory.len(), 2);
    let snapshot = metrics.get_snapshot();
    assert_eq!(snapshot.events_applied, 3);
    assert_eq!(snapshot.events_discarded, 1);
}
