pub mod drainers;
pub mod identity_bridge;
pub mod ingestion;
pub mod orchestrator;
pub mod verification;

pub use identity_bridge::IdentityBridge;
pub use ingestion::{ActiveSession, IngestionBuffer};
pub use orchestrator::{CycleOutcome, CycleReport, DrainOrchestrator, DrainStatus};
pub use verification::{DrainVerifier, VerificationReport};
