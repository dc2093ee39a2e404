use crate::application::ports::record_store::ExternalLoginStore;
use crate::application::ports::remote_sink::{RemoteLoginDraft, RemoteSink};
use crate::application::services::drainers::{DrainCycle, TableDrainer};
use crate::shared::error::SyncError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

const RETENTION_DAYS: i64 = 7;

/// Upserts dirty external-login links keyed by their (provider, subject)
/// pair.
pub struct ExternalLoginDrainer {
    store: Arc<dyn ExternalLoginStore>,
    sink: Option<Arc<dyn RemoteSink>>,
}

impl ExternalLoginDrainer {
    pub fn new(store: Arc<dyn ExternalLoginStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self { store, sink }
    }
}

#[async_trait]
impl TableDrainer for ExternalLoginDrainer {
    fn table_name(&self) -> &'static str {
        "external_logins"
    }

    fn order(&self) -> u32 {
        20
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

        let dirty = self.store.dirty_logins().await?;
        if dirty.is_empty() {
            return Ok(0);
        }

        let mut synced_ids = Vec::with_capacity(dirty.len());
        for link in &dirty {
            cycle.cancel.ensure_active()?;
            let draft = RemoteLoginDraft {
                owner_key: link.owner_key.clone(),
                login: link.login.clone(),
                deleted: link.deleted,
            };
            match sink.find_login(&link.login).await? {
                Some(remote_id) => sink.update_login(remote_id, draft).await?,
                None => {
                    sink.insert_login(draft).await?;
                }
            }
            synced_ids.push(link.local_id);
        }

        let now = Utc::now();
        self.store.mark_synced(&synced_ids, now).await?;
        self.store
            .purge_synced_before(now - Duration::days(RETENTION_DAYS))
            .await?;

        Ok(dirty.len() as u64)
    }
}
