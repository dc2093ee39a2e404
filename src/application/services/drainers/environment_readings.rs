use crate::application::ports::record_store::EnvironmentReadingStore;
use crate::application::ports::remote_sink::{RemoteEnvironmentReading, RemoteSink};
use crate::application::services::drainers::{DrainCycle, TableDrainer};
use crate::domain::value_objects::OwnerKey;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const CHUNK_SIZE: usize = 100;
const RETENTION_DAYS: i64 = 30;

/// Chunked insert-only upload of ambient-environment readings; same
/// timestamp-cutoff marking as vital signs.
pub struct EnvironmentReadingDrainer {
    store: Arc<dyn EnvironmentReadingStore>,
    sink: Option<Arc<dyn RemoteSink>>,
}

impl EnvironmentReadingDrainer {
    pub fn new(store: Arc<dyn EnvironmentReadingStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self { store, sink }
    }
}

#[async_trait]
impl TableDrainer for EnvironmentReadingDrainer {
    fn table_name(&self) -> &'static str {
        "environment_readings"
    }

    fn order(&self) -> u32 {
        50
    }

    async fn drain(&self, cycle: &DrainCycle) -> Result<u64, SyncError> {
        let Some(sink) = self.sink.as_ref() else {
            tracing::debug!(
                target: "sync::drain",
                table = self.table_name(),
                "no remote sink configured; local-only mode"
            );
            return Ok(0);
        };

        let dirty = self.store.dirty_readings().await?;
        if dirty.is_empty() {
            return Ok(0);
        }

        let batch: Vec<RemoteEnvironmentReading> = dirty
            .iter()
            .map(|reading| RemoteEnvironmentReading {
                owner_key: reading.owner_key.clone(),
                kind: reading.kind.as_str().to_string(),
                value: reading.value,
                unit: reading.unit.clone(),
                source: reading.source.clone(),
                recorded_at: reading.recorded_at,
            })
            .collect();

        for chunk in batch.chunks(CHUNK_SIZE) {
            cycle.cancel.ensure_active()?;
            sink.insert_environment_readings(chunk).await?;
        }

        let mut cutoffs: HashMap<OwnerKey, DateTime<Utc>> = HashMap::new();
        for reading in &dirty {
            cutoffs
                .entry(reading.owner_key.clone())
                .and_modify(|cutoff| {
                    if reading.recorded_at > *cutoff {
                        *cutoff = reading.recorded_at;
                    }
                })
                .or_insert(reading.recorded_at);
        }

        let now = Utc::now();
        for (owner, cutoff) in &cutoffs {
            self.store.mark_synced_through(owner, *cutoff, now).await?;
        }
        self.store
            .purge_synced_before(now - Duration::days(RETENTION_DAYS))
            .await?;

        Ok(dirty.len() as u64)
    }
}
