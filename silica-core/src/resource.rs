//! Cooperative cancellation.
//!
//! The pipeline polls a shared flag at pass boundaries and inside long
//! loops; a caller (or a watchdog thread enforcing a deadline) flips it to
//! request a prompt, state-preserving stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    canceled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a new, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    /// Clear the flag so work can resume.
    pub fn clear(&self) {
        self.canceled.store(false, Ordering::Relaxed);
    }

    /// Poll the flag.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_roundtrip() {
        let flag = CancelFlag::new();
        assert!(!flag.is_canceled());
        let other = flag.clone();
        other.cancel();
        assert!(flag.is_canceled());
        flag.clear();
        assert!(!other.is_canceled());
    }
}
