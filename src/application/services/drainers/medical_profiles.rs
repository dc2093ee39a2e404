use crate::application::ports::record_store::MedicalProfileStore;
use crate::application::ports::remote_sink::{RemoteMedicalProfileDraft, RemoteSink};
use crate::application::services::drainers::{DrainCycle, TableDrainer};
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

const RETENTION_DAYS: i64 = 7;

/// Upserts dirty medical profiles keyed by the owner's *remote* id, resolved
/// through the identity bridge. Rows whose owner has not reached the remote
/// store yet stay dirty and are retried next cycle.
pub struct MedicalProfileDrainer {
    store: Arc<dyn MedicalProfileStore>,
    sink: Option<Arc<dyn RemoteSink>>,
}

impl MedicalProfileDrainer {
    pub fn new(store: Arc<dyn MedicalProfileStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self { store, sink }
    }
}

#[async_trait]
impl TableDrainer for MedicalProfileDrainer {
    fn table_name(&self) -> &'static str {
        "medical_profiles"
    }

    fn order(&self) -> u32 {
        30
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

        let dirty = self.store.dirty_profiles().await?;
        if dirty.is_empty() {
            return Ok(0);
        }

        let mut synced_ids = Vec::with_capacity(dirty.len());
        let mut unresolved = 0u64;
        for profile in &dirty {
            cycle.cancel.ensure_active()?;
            let Some(owner_id) = cycle.bridge.resolve(&profile.owner_key).await? else {
                tracing::warn!(
                    target: "sync::drain",
                    table = self.table_name(),
                    owner = %profile.owner_key,
                    "owner not present in remote store yet; row stays dirty"
                );
                unresolved += 1;
                continue;
            };

            let draft = RemoteMedicalProfileDraft {
                blood_type: profile.blood_type.clone(),
                height_cm: profile.height_cm,
                weight_kg: profile.weight_kg,
                conditions: profile.conditions.clone(),
                deleted: profile.deleted,
            };
            match sink.find_medical_profile(owner_id).await? {
                Some(remote_id) => sink.update_medical_profile(remote_id, draft).await?,
                None => {
                    sink.insert_medical_profile(owner_id, draft).await?;
                }
            }
            synced_ids.push(profile.local_id);
        }

        // Purge only after an actual upload; an all-unresolved pass leaves
        // the table untouched.
        if !synced_ids.is_empty() {
            let now = Utc::now();
            self.store.mark_synced(&synced_ids, now).await?;
            self.store
                .purge_synced_before(now - Duration::days(RETENTION_DAYS))
                .await?;
        }

        if unresolved > 0 {
            tracing::debug!(
                target: "sync::drain",
                table = self.table_name(),
                unresolved,
                "rows deferred to the next cycle"
            );
        }

        Ok(dirty.len() as u64)
    }
}
