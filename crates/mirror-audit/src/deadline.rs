//! Session deadlines

use std::time::{Duration, Instant};

/// Overall time budget of one validation session.
///
/// Checked cooperatively between traversal steps and at checker
/// boundaries; also caps the timeout handed to each store call.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    expires_at: Option<Instant>,
}

impl Deadline {
    /// Start a deadline `budget` from now.
    ///
    /// A budget too large to represent never expires.
    pub fn after(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            expires_at: started.checked_add(budget),
        }
    }

    pub fn expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }

    pub fn remaining(&self) -> Duration {
        match self.expires_at {
            Some(expires_at) => expires_at.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Timeout for one store call: the per-call budget, never past the
    /// session deadline.
    pub fn call_timeout(&self, per_call: Duration) -> Duration {
        per_call.min(self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_expired_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
        assert_eq!(deadline.call_timeout(Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn call_timeout_is_capped_by_per_call_budget() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(!deadline.expired());
        assert_eq!(
            deadline.call_timeout(Duration::from_millis(10)),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn unrepresentable_budget_never_expires() {
        let deadline = Deadline::after(Duration::MAX);
        assert!(!deadline.expired());
        assert_eq!(deadline.remaining(), Duration::MAX);
    }
}
