use crate::application::ports::record_store::OwnerProfileStore;
use crate::application::ports::remote_sink::RemoteSink;
use crate::application::services::drainers::{DrainCycle, TableDrainer};
use crate::application::services::identity_bridge::IdentityBridge;
use crate::application::services::verification::{DrainVerifier, VerificationReport};
use crate::shared::cancel::CancelFlag;
use crate::shared::error::SyncError;
use crate::shared::metrics::{CycleMetrics, CycleMetricsSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DrainStatus {
    pub is_draining: bool,
    pub last_cycle_at: Option<i64>,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub rows_drained: u64,
    pub tables_completed: usize,
    pub verification: Option<VerificationReport>,
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// A cycle was already in flight; this trigger was dropped.
    Skipped,
}

/// Runs all table drainers in dependency order, one cycle at a time.
///
/// Triggered by a fixed-interval timer and by connectivity-restored edge
/// events; a trigger arriving mid-cycle is dropped. The first drainer to
/// fail stops the cycle — earlier drainers keep their committed work, later
/// drainers wait for the next trigger.
pub struct DrainOrchestrator {
    drainers: Vec<Arc<dyn TableDrainer>>,
    profiles: Arc<dyn OwnerProfileStore>,
    sink: Option<Arc<dyn RemoteSink>>,
    verifier: Option<DrainVerifier>,
    status: Arc<RwLock<DrainStatus>>,
    metrics: Arc<CycleMetrics>,
    gate: Mutex<()>,
}

impl DrainOrchestrator {
    pub fn new(profiles: Arc<dyn OwnerProfileStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self {
            drainers: Vec::new(),
            profiles,
            sink,
            verifier: None,
            status: Arc::new(RwLock::new(DrainStatus::default())),
            metrics: Arc::new(CycleMetrics::new()),
            gate: Mutex::new(()),
        }
    }

    /// Registration order breaks ties between equal `order()` values; the
    /// sort is stable.
    pub fn register(&mut self, drainer: Arc<dyn TableDrainer>) {
        self.drainers.push(drainer);
        self.drainers.sort_by_key(|drainer| drainer.order());
    }

    pub fn with_verifier(mut self, verifier: DrainVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub async fn run_cycle(&self, cancel: &CancelFlag) -> Result<CycleOutcome, SyncError> {
        let Ok(_guard) = self.gate.try_lock() else {
            tracing::debug!(target: "sync::drain", "drain cycle already in flight; dropping trigger");
            self.metrics.record_skipped();
            return Ok(CycleOutcome::Skipped);
        };

        self.status.write().await.is_draining = true;

        // The bridge cache must not outlive this cycle.
        let bridge = IdentityBridge::new(Arc::clone(&self.profiles), self.sink.clone());
        let cycle = DrainCycle::new(cancel.clone(), bridge);
        tracing::debug!(
            target: "sync::drain",
            cycle_id = %cycle.cycle_id,
            tables = self.drainers.len(),
            "drain cycle started"
        );

        let mut rows_drained = 0u64;
        let mut tables_completed = 0usize;
        for drainer in &self.drainers {
            let result = match cycle.cancel.ensure_active() {
                Ok(()) => drainer.drain(&cycle).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(rows) => {
                    rows_drained += rows;
                    tables_completed += 1;
                    if rows > 0 {
                        tracing::info!(
                            target: "sync::drain",
                            cycle_id = %cycle.cycle_id,
                            table = drainer.table_name(),
                            rows,
                            "table drained"
                        );
                    }
                }
                Err(err) => {
                    return self.fail_cycle(&cycle, drainer.table_name(), err).await;
                }
            }
        }

        let verification = match &self.verifier {
            Some(verifier) => match verifier.verify().await {
                Ok(report) => Some(report),
                Err(err) => {
                    // Verification is best-effort; it never fails the cycle.
                    tracing::warn!(
                        target: "sync::verify",
                        cycle_id = %cycle.cycle_id,
                        error = %err,
                        "post-drain verification failed"
                    );
                    None
                }
            },
            None => None,
        };

        {
            let mut status = self.status.write().await;
            status.is_draining = false;
            status.last_cycle_at = Some(chrono::Utc::now().timestamp());
            status.cycles_completed += 1;
            status.last_error = None;
        }
        self.metrics.record_completed(rows_drained);
        tracing::info!(
            target: "sync::drain",
            cycle_id = %cycle.cycle_id,
            rows = rows_drained,
            tables = tables_completed,
            "drain cycle completed"
        );

        Ok(CycleOutcome::Completed(CycleReport {
            cycle_id: cycle.cycle_id,
            rows_drained,
            tables_completed,
            verification,
        }))
    }

    async fn fail_cycle(
        &self,
        cycle: &DrainCycle,
        table: &'static str,
        err: SyncError,
    ) -> Result<CycleOutcome, SyncError> {
        {
            let mut status = self.status.write().await;
            status.is_draining = false;
            status.cycles_failed += 1;
            status.last_error = Some(err.to_string());
        }
        self.metrics.record_failed();
        // Every retry would repeat this line, so keep it below error level.
        tracing::debug!(
            target: "sync::drain",
            cycle_id = %cycle.cycle_id,
            table,
            error = %err,
            "drain cycle stopped; dirty rows retried on next trigger"
        );
        Err(err)
    }

    /// Fixed-interval trigger. The handle is owned by the host; aborting it
    /// (or cancelling the flag) stops the schedule.
    pub fn schedule(self: &Arc<Self>, interval: Duration, cancel: CancelFlag) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the schedule
            // starts one full interval after start-up.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if cancel.is_cancelled() {
                    break;
                }
                if let Err(err) = orchestrator.run_cycle(&cancel).await {
                    tracing::debug!(
                        target: "sync::drain",
                        error = %err,
                        "scheduled drain failed; retrying on next tick"
                    );
                }
            }
        })
    }

    /// Edge-triggered "now online" events. Errors inside the handler are
    /// swallowed; the timer is the reliability backstop.
    pub fn watch_connectivity(
        self: &Arc<Self>,
        mut online: mpsc::Receiver<()>,
        cancel: CancelFlag,
    ) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(()) = online.recv().await {
                if cancel.is_cancelled() {
                    break;
                }
                tracing::debug!(target: "sync::drain", "connectivity restored; triggering drain");
                if let Err(err) = orchestrator.run_cycle(&cancel).await {
                    tracing::debug!(
                        target: "sync::drain",
                        error = %err,
                        "connectivity-triggered drain failed"
                    );
                }
            }
        })
    }

    pub async fn status(&self) -> DrainStatus {
        self.status.read().await.clone()
    }

    pub fn metrics(&self) -> CycleMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewOwnerProfile, OwnerProfile};
    use crate::domain::value_objects::OwnerKey;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex as StdMutex;

    struct EmptyProfileStore;

    #[async_trait]
    impl OwnerProfileStore for EmptyProfileStore {
        async fn add(
            &self,
            _draft: NewOwnerProfile,
            _as_synced: bool,
        ) -> Result<OwnerProfile, SyncError> {
            unreachable!()
        }

        async fn update(&self, _profile: &OwnerProfile) -> Result<(), SyncError> {
            unreachable!()
        }

        async fn find_by_owner_key(
            &self,
            _key: &OwnerKey,
        ) -> Result<Option<OwnerProfile>, SyncError> {
            Ok(None)
        }

        async fn dirty_profiles(&self) -> Result<Vec<OwnerProfile>, SyncError> {
            Ok(Vec::new())
        }

        async fn mark_synced(
            &self,
            _ids: &[i64],
            _synced_at: DateTime<Utc>,
        ) -> Result<(), SyncError> {
            Ok(())
        }

        async fn recently_synced(&self, _limit: u32) -> Result<Vec<OwnerProfile>, SyncError> {
            Ok(Vec::new())
        }

        async fn soft_delete(&self, _local_id: i64) -> Result<(), SyncError> {
            Ok(())
        }

        async fn purge_synced_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, SyncError> {
            Ok(0)
        }
    }

    struct ScriptedDrainer {
        name: &'static str,
        order: u32,
        rows: u64,
        fail: bool,
        calls: Arc<AtomicU64>,
        log: Arc<StdMutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl TableDrainer for ScriptedDrainer {
        fn table_name(&self) -> &'static str {
            self.name
        }

        fn order(&self) -> u32 {
            self.order
        }

        async fn drain(&self, _cycle: &DrainCycle) -> Result<u64, SyncError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                Err(SyncError::Remote("scripted failure".into()))
            } else {
                Ok(self.rows)
            }
        }
    }

    fn orchestrator_with(
        drainers: Vec<Arc<dyn TableDrainer>>,
    ) -> Arc<DrainOrchestrator> {
        let mut orchestrator = DrainOrchestrator::new(Arc::new(EmptyProfileStore), None);
        for drainer in drainers {
            orchestrator.register(drainer);
        }
        Arc::new(orchestrator)
    }

    fn scripted(
        name: &'static str,
        order: u32,
        rows: u64,
        fail: bool,
        log: &Arc<StdMutex<Vec<&'static str>>>,
    ) -> (Arc<ScriptedDrainer>, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let drainer = Arc::new(ScriptedDrainer {
            name,
            order,
            rows,
            fail,
            calls: Arc::clone(&calls),
            log: Arc::clone(log),
        });
        (drainer, calls)
    }

    #[tokio::test]
    async fn test_drainers_run_in_order() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let (first, _) = scripted("profiles", 10, 1, false, &log);
        let (second, _) = scripted("samples", 40, 2, false, &log);
        let (third, _) = scripted("sessions", 60, 3, false, &log);
        // Registered out of order on purpose.
        let orchestrator = orchestrator_with(vec![third, first, second]);

        let outcome = orchestrator.run_cycle(&CancelFlag::new()).await.unwrap();
        match outcome {
            CycleOutcome::Completed(report) => {
                assert_eq!(report.rows_drained, 6);
                assert_eq!(report.tables_completed, 3);
            }
            CycleOutcome::Skipped => panic!("cycle should have run"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["profiles", "samples", "sessions"]);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_cycle() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let (first, first_calls) = scripted("profiles", 10, 1, false, &log);
        let (second, second_calls) = scripted("samples", 40, 0, true, &log);
        let (third, third_calls) = scripted("sessions", 60, 0, false, &log);
        let orchestrator = orchestrator_with(vec![first, second, third]);

        let result = orchestrator.run_cycle(&CancelFlag::new()).await;
        assert!(matches!(result, Err(SyncError::Remote(_))));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);

        let status = orchestrator.status().await;
        assert!(!status.is_draining);
        assert_eq!(status.cycles_failed, 1);
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_cancelled_flag_aborts_before_any_drainer() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let (first, first_calls) = scripted("profiles", 10, 1, false, &log);
        let orchestrator = orchestrator_with(vec![first]);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = orchestrator.run_cycle(&cancel).await;
        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reentrant_trigger_is_dropped() {
        struct SlowDrainer {
            calls: Arc<AtomicU64>,
        }

        #[async_trait]
        impl TableDrainer for SlowDrainer {
            fn table_name(&self) -> &'static str {
                "slow"
            }

            fn order(&self) -> u32 {
                10
            }

            async fn drain(&self, _cycle: &DrainCycle) -> Result<u64, SyncError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(1)
            }
        }

        let calls = Arc::new(AtomicU64::new(0));
        let orchestrator = orchestrator_with(vec![Arc::new(SlowDrainer {
            calls: Arc::clone(&calls),
        })]);

        let background = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.run_cycle(&CancelFlag::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = orchestrator.run_cycle(&CancelFlag::new()).await.unwrap();
        assert!(matches!(second, CycleOutcome::Skipped));

        let first = background.await.unwrap().unwrap();
        assert!(matches!(first, CycleOutcome::Completed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.metrics().skipped, 1);
    }

    #[tokio::test]
    async fn test_connectivity_trigger_runs_a_cycle() {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let (first, first_calls) = scripted("profiles", 10, 1, false, &log);
        let orchestrator = orchestrator_with(vec![first]);

        let (tx, rx) = mpsc::channel(4);
        let handle = orchestrator.watch_connectivity(rx, CancelFlag::new());

        tx.send(()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);

        drop(tx);
        let _ = handle.await;
    }
}
