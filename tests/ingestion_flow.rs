use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;
use vitalsync::application::ports::record_store::{SleepSessionStore, VitalSignStore};
use vitalsync::domain::entities::{SleepRecord, TelemetryEvent, VitalReading};
use vitalsync::domain::value_objects::{OwnerKey, VitalKind};
use vitalsync::shared::error::SyncError;
use vitalsync::{ActiveSession, EngineConfig, SyncEngine};

fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config.drain.auto_drain = false;
    config.ingestion.flush_interval_secs = 1;
    config
}

fn session(key: &str) -> ActiveSession {
    ActiveSession {
        owner_key: OwnerKey::new(key.to_string()).unwrap(),
    }
}

fn heart_rate(value: f64) -> TelemetryEvent {
    TelemetryEvent::Vital(VitalReading {
        kind: VitalKind::HeartRate,
        value,
        unit: None,
        source: None,
        recorded_at: Utc::now(),
    })
}

#[tokio::test]
async fn telemetry_is_stamped_and_flushed_into_the_dirty_queue() {
    let engine = SyncEngine::initialize(test_config(), None).await.unwrap();
    let store = engine.store();

    let (tx, rx) = mpsc::channel(16);
    engine
        .start_ingestion(Some(session("alice")), rx)
        .await
        .unwrap();

    tx.send(heart_rate(62.0)).await.unwrap();
    tx.send(heart_rate(63.0)).await.unwrap();
    tx.send(TelemetryEvent::Sleep(SleepRecord {
        started_at: Utc::now() - chrono::Duration::hours(8),
        ended_at: Utc::now(),
        quality: Some(0.9),
        source: Some("ring".to_string()),
    }))
    .await
    .unwrap();

    // One flush interval plus slack.
    tokio::time::sleep(Duration::from_millis(1600)).await;

    let samples = store.dirty_samples().await.unwrap();
    assert_eq!(samples.len(), 2);
    assert!(samples.iter().all(|s| s.dirty));
    assert!(samples.iter().all(|s| s.owner_key.as_str() == "alice"));
    // Missing unit and source fall back to the kind default and config.
    assert!(samples.iter().all(|s| s.unit == "bpm"));
    assert!(samples.iter().all(|s| s.source == "device"));

    let sessions = store.dirty_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].source, "ring");

    engine.stop_ingestion().await;
}

#[tokio::test]
async fn ingestion_refuses_to_start_without_a_session() {
    let engine = SyncEngine::initialize(test_config(), None).await.unwrap();

    let (_tx, rx) = mpsc::channel::<TelemetryEvent>(4);
    let result = engine.start_ingestion(None, rx).await;
    assert!(matches!(result, Err(SyncError::NoActiveSession)));
}

#[tokio::test]
async fn events_buffered_after_the_last_flush_are_dropped_on_stop() {
    let engine = SyncEngine::initialize(test_config(), None).await.unwrap();
    let store = engine.store();

    let (tx, rx) = mpsc::channel(16);
    engine
        .start_ingestion(Some(session("bob")), rx)
        .await
        .unwrap();

    tx.send(heart_rate(70.0)).await.unwrap();
    // Give the reader a moment to buffer the event, then stop before the
    // first flush tick fires.
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.stop_ingestion().await;

    assert!(store.dirty_samples().await.unwrap().is_empty());
}
