use crate::application::ports::record_store::{
    EnvironmentReadingStore, SleepSessionStore, VitalSignStore,
};
use crate::domain::entities::{
    NewEnvironmentReading, NewSleepSession, NewVitalSign, TelemetryEvent,
};
use crate::domain::value_objects::OwnerKey;
use crate::shared::error::SyncError;
use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

/// Session state for the signed-in owner, passed explicitly into
/// [`IngestionBuffer::start`]. There is no module-level cached user.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub owner_key: OwnerKey,
}

/// A telemetry event after owner and source stamping, ready for the record
/// store.
#[derive(Debug, Clone)]
enum StampedReading {
    Vital(NewVitalSign),
    Environment(NewEnvironmentReading),
    Sleep(NewSleepSession),
}

struct RunningTasks {
    shutdown: watch::Sender<bool>,
    reader: JoinHandle<()>,
    flusher: JoinHandle<()>,
}

/// Decouples the high-frequency telemetry stream from the record store's
/// write cadence.
///
/// Appends land in an in-memory list under a mutex; a periodic task swaps the
/// list out under the same lock and writes the batch outside it, so disk I/O
/// never blocks the telemetry side. Whatever is still buffered when `stop` is
/// called is discarded; the loss window is bounded by the flush interval.
pub struct IngestionBuffer {
    vitals: Arc<dyn VitalSignStore>,
    environment: Arc<dyn EnvironmentReadingStore>,
    sleep: Arc<dyn SleepSessionStore>,
    flush_interval: Duration,
    default_source: String,
    running: AsyncMutex<Option<RunningTasks>>,
}

impl IngestionBuffer {
    pub fn new(
        vitals: Arc<dyn VitalSignStore>,
        environment: Arc<dyn EnvironmentReadingStore>,
        sleep: Arc<dyn SleepSessionStore>,
        flush_interval: Duration,
        default_source: String,
    ) -> Self {
        Self {
            vitals,
            environment,
            sleep,
            flush_interval,
            default_source,
            running: AsyncMutex::new(None),
        }
    }

    /// Subscribe to the telemetry stream. Declines with `NoActiveSession`
    /// when no identity is signed in yet; the caller re-invokes after
    /// sign-in.
    pub async fn start(
        &self,
        session: Option<ActiveSession>,
        mut events: mpsc::Receiver<TelemetryEvent>,
    ) -> Result<(), SyncError> {
        let session = session.ok_or(SyncError::NoActiveSession)?;

        let mut running = self.running.lock().await;
        if running.is_some() {
            tracing::debug!(target: "sync::ingest", "ingestion buffer already running");
            return Ok(());
        }

        let buffer: Arc<Mutex<Vec<StampedReading>>> = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let reader = {
            let buffer = Arc::clone(&buffer);
            let owner = session.owner_key.clone();
            let default_source = self.default_source.clone();
            let mut shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        event = events.recv() => match event {
                            Some(event) => {
                                let stamped = stamp(event, &owner, &default_source);
                                lock_buffer(&buffer).push(stamped);
                            }
                            None => {
                                tracing::debug!(
                                    target: "sync::ingest",
                                    "telemetry stream closed"
                                );
                                break;
                            }
                        },
                    }
                }
            })
        };

        let flusher = {
            let buffer = Arc::clone(&buffer);
            let vitals = Arc::clone(&self.vitals);
            let environment = Arc::clone(&self.environment);
            let sleep = Arc::clone(&self.sleep);
            let mut shutdown = shutdown_rx;
            let interval = self.flush_interval;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = ticker.tick() => {
                            flush_batch(&buffer, &vitals, &environment, &sleep).await;
                        }
                    }
                }
            })
        };

        *running = Some(RunningTasks {
            shutdown: shutdown_tx,
            reader,
            flusher,
        });
        tracing::info!(
            target: "sync::ingest",
            owner = %session.owner_key,
            "ingestion buffer started"
        );
        Ok(())
    }

    /// Cancel the flush timer and unsubscribe from the stream. Any unflushed
    /// batch is discarded; the loss window is bounded by the flush interval.
    pub async fn stop(&self) {
        let Some(tasks) = self.running.lock().await.take() else {
            return;
        };
        let _ = tasks.shutdown.send(true);
        let _ = tasks.reader.await;
        let _ = tasks.flusher.await;
        tracing::info!(target: "sync::ingest", "ingestion buffer stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }
}

fn stamp(event: TelemetryEvent, owner: &OwnerKey, default_source: &str) -> StampedReading {
    match event {
        TelemetryEvent::Vital(reading) => StampedReading::Vital(NewVitalSign {
            owner_key: owner.clone(),
            kind: reading.kind,
            unit: reading
                .unit
                .unwrap_or_else(|| reading.kind.default_unit().to_string()),
            source: reading.source.unwrap_or_else(|| default_source.to_string()),
            value: reading.value,
            recorded_at: reading.recorded_at,
        }),
        TelemetryEvent::Environment(sample) => StampedReading::Environment(NewEnvironmentReading {
            owner_key: owner.clone(),
            kind: sample.kind,
            unit: sample
                .unit
                .unwrap_or_else(|| sample.kind.default_unit().to_string()),
            source: sample.source.unwrap_or_else(|| default_source.to_string()),
            value: sample.value,
            recorded_at: sample.recorded_at,
        }),
        TelemetryEvent::Sleep(record) => StampedReading::Sleep(NewSleepSession {
            owner_key: owner.clone(),
            started_at: record.started_at,
            ended_at: record.ended_at,
            quality: record.quality,
            source: record.source.unwrap_or_else(|| default_source.to_string()),
        }),
    }
}

fn lock_buffer(
    buffer: &Mutex<Vec<StampedReading>>,
) -> std::sync::MutexGuard<'_, Vec<StampedReading>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn flush_batch(
    buffer: &Mutex<Vec<StampedReading>>,
    vitals: &Arc<dyn VitalSignStore>,
    environment: &Arc<dyn EnvironmentReadingStore>,
    sleep: &Arc<dyn SleepSessionStore>,
) {
    let batch = std::mem::take(&mut *lock_buffer(buffer));
    if batch.is_empty() {
        return;
    }

    let mut vital_rows = Vec::new();
    let mut environment_rows = Vec::new();
    let mut sleep_rows = Vec::new();
    for reading in batch {
        match reading {
            StampedReading::Vital(row) => vital_rows.push(row),
            StampedReading::Environment(row) => environment_rows.push(row),
            StampedReading::Sleep(row) => sleep_rows.push(row),
        }
    }

    let flushed_at = Utc::now();
    let mut failed = Vec::new();

    if !vital_rows.is_empty() {
        if let Err(err) = vitals.add_many(vital_rows.clone(), false).await {
            tracing::warn!(target: "sync::ingest", error = %err, "vital-sign flush failed");
            failed.extend(vital_rows.into_iter().map(StampedReading::Vital));
        }
    }
    if !environment_rows.is_empty() {
        if let Err(err) = environment.add_many(environment_rows.clone(), false).await {
            tracing::warn!(target: "sync::ingest", error = %err, "environment flush failed");
            failed.extend(environment_rows.into_iter().map(StampedReading::Environment));
        }
    }
    if !sleep_rows.is_empty() {
        if let Err(err) = sleep.add_many(sleep_rows.clone(), false).await {
            tracing::warn!(target: "sync::ingest", error = %err, "sleep-session flush failed");
            failed.extend(sleep_rows.into_iter().map(StampedReading::Sleep));
        }
    }

    if !failed.is_empty() {
        // Failed rows go back to the front so the next flush retries them in
        // their original order.
        let mut guard = lock_buffer(buffer);
        failed.extend(guard.drain(..));
        *guard = failed;
    } else {
        tracing::debug!(
            target: "sync::ingest",
            flushed_at = flushed_at.timestamp_millis(),
            "telemetry batch flushed"
        );
    }
}
