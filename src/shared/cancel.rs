use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::shared::error::SyncError;

/// Cooperative cancellation signal threaded through a drain cycle.
///
/// Checked between drainers and between upload chunks; a chunk in flight is
/// never interrupted, so the remote transaction boundary stays the atomicity
/// unit.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn ensure_active(&self) -> Result<(), SyncError> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_active_and_sticks_after_cancel() {
        let flag = CancelFlag::new();
        assert!(flag.ensure_active().is_ok());

        let clone = flag.clone();
        clone.cancel();

        assert!(flag.is_cancelled());
        assert!(matches!(flag.ensure_active(), Err(SyncError::Cancelled)));
    }
}
