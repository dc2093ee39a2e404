use crate::application::ports::record_store::OwnerProfileStore;
use crate::application::ports::remote_sink::{RemoteProfileDraft, RemoteSink};
use crate::application::services::drainers::{DrainCycle, TableDrainer};
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

const RETENTION_DAYS: i64 = 7;

/// Upserts dirty owner profiles keyed by their email natural key. Low-volume
/// identity table, so this is a per-row loop rather than a chunked upload.
pub struct OwnerProfileDrainer {
    store: Arc<dyn OwnerProfileStore>,
    sink: Option<Arc<dyn RemoteSink>>,
}

impl OwnerProfileDrainer {
    pub fn new(store: Arc<dyn OwnerProfileStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self { store, sink }
    }
}

#[async_trait]
impl TableDrainer for OwnerProfileDrainer {
    fn table_name(&self) -> &'static str {
        "owner_profiles"
    }

    fn order(&self) -> u32 {
        10
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
        for profile in &dirty {
            cycle.cancel.ensure_active()?;
            let draft = RemoteProfileDraft {
                owner_key: profile.owner_key.clone(),
                email: profile.email.clone(),
                display_name: profile.display_name.clone(),
                birth_date: profile.birth_date,
                deleted: profile.deleted,
            };
            match sink.find_profile_by_email(&profile.email).await? {
                Some(remote) => sink.update_profile(remote.id, draft).await?,
                None => {
                    sink.insert_profile(draft).await?;
                }
            }
            synced_ids.push(profile.local_id);
        }

        let now = Utc::now();
        self.store.mark_synced(&synced_ids, now).await?;
        let purged = self
            .store
            .purge_synced_before(now - Duration::days(RETENTION_DAYS))
            .await?;
        if purged > 0 {
            tracing::debug!(
                target: "sync::drain",
                table = self.table_name(),
                purged,
                "retention purge removed synced rows"
            );
        }

        Ok(dirty.len() as u64)
    }
}
