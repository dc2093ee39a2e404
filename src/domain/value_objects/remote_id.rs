use serde::{Deserialize, Serialize};
use std::fmt;

/// Row identity assigned by the remote store. Local and remote identities are
/// independent sequences; a RemoteId is only valid against the remote store
/// it was read from and is never persisted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteId(i64);

impl RemoteId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
