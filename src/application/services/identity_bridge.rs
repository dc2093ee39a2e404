use crate::application::ports::record_store::OwnerProfileStore;
use crate::application::ports::remote_sink::RemoteSink;
use crate::domain::value_objects::{OwnerKey, RemoteId};
use crate::shared::error::SyncError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Maps a local owner identity to its remote-store row id.
///
/// Built fresh for every drain cycle; the cache lives only as long as the
/// cycle because remote ids are not stable across redeploys of the remote
/// store. A `None` result means the owner has not been drained yet — a
/// recoverable signal, not an error.
pub struct IdentityBridge {
    profiles: Arc<dyn OwnerProfileStore>,
    sink: Option<Arc<dyn RemoteSink>>,
    cache: Mutex<HashMap<OwnerKey, Option<RemoteId>>>,
}

impl IdentityBridge {
    pub fn new(profiles: Arc<dyn OwnerProfileStore>, sink: Option<Arc<dyn RemoteSink>>) -> Self {
        Self {
            profiles,
            sink,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, owner: &OwnerKey) -> Result<Option<RemoteId>, SyncError> {
        if let Some(cached) = self.cache.lock().await.get(owner) {
            return Ok(*cached);
        }

        let Some(sink) = &self.sink else {
            return Ok(None);
        };

        let resolved = match self.profiles.find_by_owner_key(owner).await? {
            None => None,
            Some(profile) => sink
                .find_profile_by_email(&profile.email)
                .await?
                .map(|remote| remote.id),
        };

        // Negative results are cached too; one miss per owner per cycle.
        self.cache.lock().await.insert(owner.clone(), resolved);
        Ok(resolved)
    }
}
