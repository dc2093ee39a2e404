use crate::application::services::identity_bridge::IdentityBridge;
use crate::shared::cancel::CancelFlag;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use uuid::Uuid;

pub mod environment_readings;
pub mod external_logins;
pub mod medical_profiles;
pub mod owner_profiles;
pub mod sleep_sessions;
pub mod vital_signs;

pub use environment_readings::EnvironmentReadingDrainer;
pub use external_logins::ExternalLoginDrainer;
pub use medical_profiles::MedicalProfileDrainer;
pub use owner_profiles::OwnerProfileDrainer;
pub use sleep_sessions::SleepSessionDrainer;
pub use vital_signs::VitalSignDrainer;

/// Per-cycle context handed to every drainer: the cooperative cancellation
/// flag, a cycle id for log correlation, and the identity bridge whose cache
/// lives exactly as long as this cycle.
pub struct DrainCycle {
    pub cycle_id: Uuid,
    pub cancel: CancelFlag,
    pub bridge: IdentityBridge,
}

impl DrainCycle {
    pub fn new(cancel: CancelFlag, bridge: IdentityBridge) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            cancel,
            bridge,
        }
    }
}

/// One entity type's upload unit.
///
/// A drainer loads its dirty rows, writes them to the remote sink, marks
/// them synced, and purges aged synced rows. It never decides to skip and
/// continue on failure — every error except per-row identity resolution
/// propagates to the orchestrator, which owns cycle-level retry policy.
#[async_trait]
pub trait TableDrainer: Send + Sync {
    fn table_name(&self) -> &'static str;

    /// Lower runs first; later drainers may depend on rows created by
    /// earlier ones.
    fn order(&self) -> u32;

    /// Returns the number of dirty rows discovered at the start of the
    /// drain, including rows left unresolved for the next cycle.
    async fn drain(&self, cycle: &DrainCycle) -> Result<u64, SyncError>;
}
