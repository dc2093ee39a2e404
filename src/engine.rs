use crate::application::ports::record_store::{
    EnvironmentReadingStore, ExternalLoginStore, MedicalProfileStore, OwnerProfileStore,
    SleepSessionStore, VitalSignStore,
};
use crate::application::ports::remote_sink::RemoteSink;
use crate::application::services::drainers::{
    EnvironmentReadingDrainer, ExternalLoginDrainer, MedicalProfileDrainer, OwnerProfileDrainer,
    SleepSessionDrainer, VitalSignDrainer,
};
use crate::application::services::{
    ActiveSession, CycleOutcome, DrainOrchestrator, DrainStatus, DrainVerifier, IngestionBuffer,
};
use crate::domain::entities::TelemetryEvent;
use crate::infrastructure::database::{ConnectionPool, SqliteRecordStore};
use crate::shared::cancel::CancelFlag;
use crate::shared::config::EngineConfig;
use crate::shared::error::SyncError;
use crate::shared::metrics::CycleMetricsSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Top-level handle wiring the local store, the ingestion buffer and the
/// drain orchestrator together. One instance per database.
pub struct SyncEngine {
    config: EngineConfig,
    pool: ConnectionPool,
    store: Arc<SqliteRecordStore>,
    ingestion: Arc<IngestionBuffer>,
    orchestrator: Arc<DrainOrchestrator>,
    cancel: CancelFlag,
}

impl SyncEngine {
    /// Opens (and migrates) the local database and assembles the sync
    /// pipeline. `sink` is `None` in local-only mode; everything still
    /// records locally and drain cycles become no-ops.
    pub async fn initialize(
        config: EngineConfig,
        sink: Option<Arc<dyn RemoteSink>>,
    ) -> Result<Self, SyncError> {
        config.validate().map_err(SyncError::Configuration)?;

        let pool = ConnectionPool::new(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.connection_timeout),
        )
        .await?;
        pool.migrate().await?;
        tracing::info!(target: "sync::engine", url = %config.database.url, "local store ready");

        let store = Arc::new(SqliteRecordStore::new(pool.pool().clone()));
        let profiles: Arc<dyn OwnerProfileStore> = store.clone();
        let logins: Arc<dyn ExternalLoginStore> = store.clone();
        let medical: Arc<dyn MedicalProfileStore> = store.clone();
        let vitals: Arc<dyn VitalSignStore> = store.clone();
        let environment: Arc<dyn EnvironmentReadingStore> = store.clone();
        let sleep: Arc<dyn SleepSessionStore> = store.clone();

        let ingestion = Arc::new(IngestionBuffer::new(
            vitals.clone(),
            environment.clone(),
            sleep.clone(),
            Duration::from_secs(config.ingestion.flush_interval_secs),
            config.ingestion.default_source.clone(),
        ));

        let mut orchestrator = DrainOrchestrator::new(profiles.clone(), sink.clone());
        orchestrator.register(Arc::new(OwnerProfileDrainer::new(
            profiles.clone(),
            sink.clone(),
        )));
        orchestrator.register(Arc::new(ExternalLoginDrainer::new(
            logins.clone(),
            sink.clone(),
        )));
        orchestrator.register(Arc::new(MedicalProfileDrainer::new(medical, sink.clone())));
        orchestrator.register(Arc::new(VitalSignDrainer::new(vitals, sink.clone())));
        orchestrator.register(Arc::new(EnvironmentReadingDrainer::new(
            environment,
            sink.clone(),
        )));
        orchestrator.register(Arc::new(SleepSessionDrainer::new(sleep, sink.clone())));

        let orchestrator = match (&sink, config.drain.verify_after_drain) {
            (Some(sink), true) => {
                orchestrator.with_verifier(DrainVerifier::new(profiles, logins, sink.clone()))
            }
            _ => orchestrator,
        };

        Ok(Self {
            config,
            pool,
            store,
            ingestion,
            orchestrator: Arc::new(orchestrator),
            cancel: CancelFlag::new(),
        })
    }

    /// Start buffering the telemetry stream for the signed-in owner.
    pub async fn start_ingestion(
        &self,
        session: Option<ActiveSession>,
        events: mpsc::Receiver<TelemetryEvent>,
    ) -> Result<(), SyncError> {
        self.ingestion.start(session, events).await
    }

    pub async fn stop_ingestion(&self) {
        self.ingestion.stop().await;
    }

    /// Run one drain cycle right now, outside the schedule.
    pub async fn drain_now(&self) -> Result<CycleOutcome, SyncError> {
        self.orchestrator.run_cycle(&self.cancel).await
    }

    /// Start the fixed-interval drain schedule, if auto-drain is enabled.
    pub fn start_auto_drain(&self) -> Option<JoinHandle<()>> {
        if !self.config.drain.auto_drain {
            return None;
        }
        let interval = Duration::from_secs(self.config.drain.interval_secs);
        Some(self.orchestrator.schedule(interval, self.cancel.clone()))
    }

    /// Drain on connectivity-restored edges delivered through `online`.
    pub fn watch_connectivity(&self, online: mpsc::Receiver<()>) -> JoinHandle<()> {
        self.orchestrator
            .watch_connectivity(online, self.cancel.clone())
    }

    pub async fn drain_status(&self) -> DrainStatus {
        self.orchestrator.status().await
    }

    pub fn metrics(&self) -> CycleMetricsSnapshot {
        self.orchestrator.metrics()
    }

    /// Direct access to the local record store for application reads and
    /// writes; every mutation through it lands in the dirty queues.
    pub fn store(&self) -> Arc<SqliteRecordStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cancel background work and close the pool. In-flight cycles stop at
    /// the next cancellation check; unflushed telemetry is dropped.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.ingestion.stop().await;
        self.pool.close().await;
        tracing::info!(target: "sync::engine", "sync engine stopped");
    }
}
