use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{BopError, Result};

/// Shared cancellation switch, polled between face-pair tasks. Work that
/// already started on a pair runs to completion.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(BopError::Aborted)` once the flag is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_aborted() {
            Err(BopError::Aborted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let flag = AbortFlag::new();
        let other = flag.clone();
        assert!(flag.check().is_ok());
        other.abort();
        assert!(flag.is_aborted());
        assert!(matches!(flag.check(), Err(BopError::Aborted)));
    }
}
