use crate::application::ports::record_store::VitalSignStore;
use crate::application::ports::remote_sink::{RemoteSink, RemoteVitalSign};
use crate::application::services::drainers::{DrainCycle, TableDrainer};
use crate::domain::value_objects::OwnerKey;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const CHUNK_SIZE: usize = 100;
const RETENTION_DAYS: i64 = 7;

/// Uploads dirty vital-sign samples in fixed-size chunks, each chunk one
/// remote transaction. A chunk failure aborts the whole drain: nothing is
/// marked synced unless every row read at the start was written.
///
/// Rows are marked synced by (owner, max recorded_at in the uploaded batch),
/// never by wall clock, so samples inserted while the upload is in flight
/// stay dirty for the next cycle.
pub struct VitalSignDrainer {
    store: Arc<dyn VitalSignStore>,
    sink: Option<Arc<dyn RemoteSink>>,
}

impl VitalSignDrainer {
    pub fn new(store: Arc<dyn VitalSignStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self { store, sink }
    }
}

#[async_trait]
impl TableDrainer for VitalSignDrainer {
    fn table_name(&self) -> &'static str {
        "vital_signs"
    }

    fn order(&self) -> u32 {
        40
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

        let dirty = self.store.dirty_samples().await?;
        if dirty.is_empty() {
            return Ok(0);
        }

        let batch: Vec<RemoteVitalSign> = dirty
            .iter()
            .map(|sample| RemoteVitalSign {
                owner_key: sample.owner_key.clone(),
                kind: sample.kind.as_str().to_string(),
                value: sample.value,
                unit: sample.unit.clone(),
                source: sample.source.clone(),
                recorded_at: sample.recorded_at,
            })
            .collect();

        for chunk in batch.chunks(CHUNK_SIZE) {
            cycle.cancel.ensure_active()?;
            sink.insert_vital_signs(chunk).await?;
        }

        let mut cutoffs: HashMap<OwnerKey, DateTime<Utc>> = HashMap::new();
        for sample in &dirty {
            cutoffs
                .entry(sample.owner_key.clone())
                .and_modify(|cutoff| {
                    if sample.recorded_at > *cutoff {
                        *cutoff = sample.recorded_at;
                    }
                })
                .or_insert(sample.recorded_at);
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
