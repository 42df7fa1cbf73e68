//! Time budget and cancellation for one query
//!
//! Checked cooperatively between stages; a storage call already in flight
//! is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use signet_core::errors::{ExError, ExErrorKind};

use crate::Result;

/// Shared flag a caller can trip from another thread to stop a running query
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
    cancel: Option<CancelToken>,
}

impl Deadline {
    /// Start the clock now
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
            cancel: None,
        }
    }

    /// Also stop at the next check once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub fn is_expired(&self) -> bool {
        self.start.elapsed() > self.budget
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// # Errors
    ///
    /// `Cancelled` once the token is tripped, otherwise `Timeout` once the
    /// budget is spent; `stage` names what was about to run.
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.is_cancelled() {
            return Err(ExError::new(ExErrorKind::Cancelled)
                .with_op("document_query")
                .with_message(format!(
                    "cancelled before {} (elapsed {}ms)",
                    stage,
                    self.elapsed_ms()
                )));
        }
        if self.is_expired() {
            return Err(ExError::new(ExErrorKind::Timeout)
                .with_op("document_query")
                .with_message(format!(
                    "{}ms budget exceeded before {} (elapsed {}ms)",
                    self.budget.as_millis(),
                    stage,
                    self.elapsed_ms()
                )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_deadline_passes() {
        let deadline = Deadline::new(Duration::from_secs(60));
        assert!(deadline.check("fetch").is_ok());
    }

    #[test]
    fn test_spent_deadline_fails_with_timeout() {
        let deadline = Deadline::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));

        let err = deadline.check("load_bodies").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Timeout);
        assert!(err.message().contains("load_bodies"));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancelToken::new();
        let deadline = Deadline::new(Duration::from_secs(60)).with_cancellation(token.clone());
        assert!(deadline.check("fetch").is_ok());

        std::thread::spawn(move || token.cancel()).join().unwrap();

        let err = deadline.check("load_signatures").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Cancelled);
        assert_eq!(err.code(), "ERR_CANCELLED");
        assert!(err.message().contains("load_signatures"));
    }

    #[test]
    fn test_cancellation_wins_over_timeout() {
        let token = CancelToken::new();
        token.cancel();
        let deadline = Deadline::new(Duration::ZERO).with_cancellation(token);
        std::thread::sleep(Duration::from_millis(2));

        assert_eq!(
            deadline.check("fetch").unwrap_err().kind(),
            ExErrorKind::Cancelled
        );
    }
}
