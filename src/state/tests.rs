use super::*;
use crate::contact::{demo_roster, NewContact};
use crate::geo::Coordinate;
use crate::location::{
    LocateError, PositionProvider, PositionSource, ReportedPosition, UnavailablePosition,
};
use crate::radar::RadarSurface;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Answers after a delay
struct SlowProvider {
    delay: Duration,
    position: Coordinate,
}

#[async_trait]
impl PositionProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn current_position(&self) -> Result<Coordinate, LocateError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.position)
    }
}

fn options() -> EngineOptions {
    EngineOptions {
        seed: Some(7),
        ..EngineOptions::default()
    }
}

fn create_engine() -> Arc<RadarEngine> {
    Arc::new(RadarEngine::new(
        options(),
        Arc::new(UnavailablePosition),
        demo_roster(),
    ))
}

fn fallback() -> Coordinate {
    Coordinate::new(40.7128, -74.0060)
}

/// Let spawned tasks run without moving the clock meaningfully
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[test]
fn test_new_engine_is_idle() {
    let engine = create_engine();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, TrackingStatus::Idle);
    assert!(snapshot.fix.is_none());
    assert!(snapshot.nearby.is_empty());
    assert_eq!(snapshot.contacts.len(), demo_roster().len());
    assert!(engine.user_position().is_none());
}

#[test]
fn test_add_contact_appends() {
    let engine = create_engine();
    let before = engine.contacts().len();

    let contact = engine
        .add_contact(NewContact {
            name: "Dana Kim".to_string(),
            phone: "+1 555 0100".to_string(),
            registered: true,
            ..Default::default()
        })
        .unwrap();

    let contacts = engine.contacts();
    assert_eq!(contacts.len(), before + 1);
    assert_eq!(contacts.last().unwrap().id, contact.id);
    // Idle: placed at the fallback coordinate
    assert_eq!(contact.position, fallback());
}

#[test]
fn test_add_contact_with_empty_name_rejected() {
    let engine = create_engine();
    let before = engine.contacts();

    let result = engine.add_contact(NewContact {
        name: String::new(),
        phone: "+1 555 0100".to_string(),
        ..Default::default()
    });

    assert_eq!(result, Err(crate::contact::ValidationError::MissingName));
    assert_eq!(engine.contacts(), before);
}

#[test]
fn test_add_contact_broadcasts() {
    let engine = create_engine();
    let mut rx = engine.subscribe();

    engine
        .add_contact(NewContact {
            name: "Dana".to_string(),
            phone: "555 0100".to_string(),
            ..Default::default()
        })
        .unwrap();

    assert!(matches!(rx.try_recv(), Ok(RadarUpdate::ContactAdded { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_start_tracking_falls_back_and_ticks_immediately() {
    let engine = create_engine();

    let fix = engine.start_tracking(None).await.unwrap();
    assert_eq!(fix.source, PositionSource::Fallback);
    assert_eq!(fix.position, fallback());

    settle().await;

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, TrackingStatus::Tracking);
    assert_eq!(snapshot.ticks, 1);

    let ids: Vec<String> = snapshot.nearby.iter().map(|n| n.contact.id.clone()).collect();
    assert_eq!(ids, vec!["c-001", "c-002", "c-003", "c-005"]);

    engine.stop_tracking();
}

#[tokio::test(start_paused = true)]
async fn test_reported_position_used() {
    let engine = create_engine();
    let reported = Coordinate::new(40.80, -74.20);

    let fix = engine
        .start_tracking(Some(Arc::new(ReportedPosition(reported))))
        .await
        .unwrap();
    settle().await;

    assert_eq!(fix.source, PositionSource::Device);
    assert_eq!(engine.user_position(), Some(reported));

    // Only the contact across the river is in range now
    let ids: Vec<String> = engine.nearby().iter().map(|n| n.contact.id.clone()).collect();
    assert_eq!(ids, vec!["c-007"]);

    engine.stop_tracking();
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_interval() {
    let engine = create_engine();
    engine.start_tracking(None).await.unwrap();

    settle().await;
    assert_eq!(engine.snapshot().ticks, 1);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(engine.snapshot().ticks, 2);

    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert_eq!(engine.snapshot().ticks, 4);

    engine.stop_tracking();
}

#[tokio::test(start_paused = true)]
async fn test_non_participants_never_move() {
    let engine = create_engine();
    let before = engine.contacts();

    engine.start_tracking(None).await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;
    engine.stop_tracking();

    for (old, new) in before.iter().zip(engine.contacts()) {
        if old.registered {
            assert_ne!(old.position, new.position);
        } else {
            assert_eq!(*old, new);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_mutation() {
    let engine = create_engine();
    engine.start_tracking(None).await.unwrap();
    settle().await;

    assert!(engine.stop_tracking());
    let frozen = engine.contacts();

    tokio::time::sleep(Duration::from_secs(30)).await;

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, TrackingStatus::Idle);
    assert!(snapshot.fix.is_none());
    assert!(snapshot.nearby.is_empty());
    assert_eq!(snapshot.contacts, frozen);
}

#[tokio::test(start_paused = true)]
async fn test_stale_session_tick_ignored() {
    let engine = create_engine();
    engine.start_tracking(None).await.unwrap();
    let generation = engine.session_generation().unwrap();

    engine.stop_tracking();
    let frozen = engine.contacts();

    assert!(!engine.tick_session(generation));
    assert_eq!(engine.contacts(), frozen);
}

#[tokio::test(start_paused = true)]
async fn test_late_fix_discarded_after_stop() {
    let engine = create_engine();
    let provider: Arc<dyn PositionProvider> = Arc::new(SlowProvider {
        delay: Duration::from_secs(5),
        position: Coordinate::new(51.5, -0.12),
    });

    let starter = Arc::clone(&engine);
    let pending = tokio::spawn(async move { starter.start_tracking(Some(provider)).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!engine.stop_tracking());

    let result = pending.await.unwrap();
    assert_eq!(result, Err(TrackingError::Superseded));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(engine.status(), TrackingStatus::Idle);
    assert_eq!(engine.snapshot().ticks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_starts_share_one_session() {
    let engine = create_engine();
    let slow = |latitude: f64| -> Arc<dyn PositionProvider> {
        Arc::new(SlowProvider {
            delay: Duration::from_secs(1),
            position: Coordinate::new(latitude, -74.0),
        })
    };

    let first_engine = Arc::clone(&engine);
    let first_provider = slow(40.71);
    let first = tokio::spawn(async move { first_engine.start_tracking(Some(first_provider)).await });
    let second_engine = Arc::clone(&engine);
    let second_provider = slow(40.72);
    let second =
        tokio::spawn(async move { second_engine.start_tracking(Some(second_provider)).await });

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.status(), TrackingStatus::Tracking);
    assert_eq!(engine.snapshot().fix, Some(first));

    settle().await;
    assert_eq!(engine.snapshot().ticks, 1);

    engine.stop_tracking();
}

#[tokio::test(start_paused = true)]
async fn test_start_before_stop_discarded_after_restart() {
    let engine = create_engine();
    let provider: Arc<dyn PositionProvider> = Arc::new(SlowProvider {
        delay: Duration::from_secs(5),
        position: Coordinate::new(51.5, -0.12),
    });

    let starter = Arc::clone(&engine);
    let pending = tokio::spawn(async move { starter.start_tracking(Some(provider)).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    engine.stop_tracking();
    let fix = engine.start_tracking(None).await.unwrap();

    assert_eq!(pending.await.unwrap(), Err(TrackingError::Superseded));
    assert_eq!(engine.snapshot().fix, Some(fix));
    assert_eq!(engine.user_position(), Some(fallback()));

    engine.stop_tracking();
}

#[tokio::test(start_paused = true)]
async fn test_start_while_tracking_keeps_session() {
    let engine = create_engine();
    let first = engine.start_tracking(None).await.unwrap();
    let generation = engine.session_generation();

    let second = engine
        .start_tracking(Some(Arc::new(ReportedPosition(Coordinate::new(0.0, 0.0)))))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.session_generation(), generation);

    engine.stop_tracking();
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop() {
    let engine = create_engine();
    engine.start_tracking(None).await.unwrap();
    settle().await;
    engine.stop_tracking();

    engine.start_tracking(None).await.unwrap();
    settle().await;

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, TrackingStatus::Tracking);
    assert_eq!(snapshot.ticks, 1);

    engine.stop_tracking();
}

#[tokio::test(start_paused = true)]
async fn test_updates_broadcast_in_order() {
    let engine = create_engine();
    let mut rx = engine.subscribe();

    engine.start_tracking(None).await.unwrap();
    settle().await;
    engine.stop_tracking();

    assert!(matches!(rx.try_recv(), Ok(RadarUpdate::TrackingStarted { .. })));
    match rx.try_recv() {
        Ok(RadarUpdate::Tick { tick, nearby, .. }) => {
            assert_eq!(tick, 1);
            assert_eq!(nearby.len(), 4);
        }
        other => panic!("expected tick, got {:?}", other),
    }
    assert!(matches!(rx.try_recv(), Ok(RadarUpdate::TrackingStopped { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_radar_only_while_tracking() {
    let engine = create_engine();
    let surface = RadarSurface::square(300.0, 10.0);

    assert!(engine.radar(&surface).is_none());

    engine.start_tracking(None).await.unwrap();
    settle().await;

    let blips = engine.radar(&surface).unwrap();
    assert_eq!(blips.len(), 4);

    engine.stop_tracking();
    assert!(engine.radar(&surface).is_none());
}

#[test]
fn test_stop_when_idle_is_noop() {
    let engine = create_engine();
    let mut rx = engine.subscribe();

    assert!(!engine.stop_tracking());
    assert!(rx.try_recv().is_err());
}
