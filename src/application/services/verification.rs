use crate::application::ports::record_store::{ExternalLoginStore, OwnerProfileStore};
use crate::application::ports::remote_sink::RemoteSink;
use crate::shared::error::SyncError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_SAMPLE_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationReport {
    pub checked: u64,
    pub missing: u64,
}

/// Best-effort reconciliation pass run after a successful drain cycle.
///
/// Samples the most recently synced identity rows and checks they still
/// exist remotely, to catch silently dropped writes. Read-only: a missing
/// row is logged, never re-uploaded here.
pub struct DrainVerifier {
    profiles: Arc<dyn OwnerProfileStore>,
    logins: Arc<dyn ExternalLoginStore>,
    sink: Arc<dyn RemoteSink>,
    sample_limit: u32,
}

impl DrainVerifier {
    pub fn new(
        profiles: Arc<dyn OwnerProfileStore>,
        logins: Arc<dyn ExternalLoginStore>,
        sink: Arc<dyn RemoteSink>,
    ) -> Self {
        Self {
            profiles,
            logins,
            sink,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    pub async fn verify(&self) -> Result<VerificationReport, SyncError> {
        let mut checked = 0u64;
        let mut missing = 0u64;

        for profile in self.profiles.recently_synced(self.sample_limit).await? {
            if profile.deleted {
                continue;
            }
            checked += 1;
            if !self.sink.profile_exists(&profile.email).await? {
                missing += 1;
                tracing::warn!(
                    target: "sync::verify",
                    email = %profile.email,
                    "synced owner profile missing from remote store"
                );
            }
        }

        for link in self.logins.recently_synced(self.sample_limit).await? {
            if link.deleted {
                continue;
            }
            checked += 1;
            if !self.sink.login_exists(&link.login).await? {
                missing += 1;
                tracing::warn!(
                    target: "sync::verify",
                    login = %link.login,
                    "synced external login missing from remote store"
                );
            }
        }

        Ok(VerificationReport { checked, missing })
    }
}
