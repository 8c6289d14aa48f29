//! Per-request deadline shared by every suspension point

use crate::error::{PipelineError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Absolute deadline of one request
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// Time left, zero once passed
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Budget for one call: `call_timeout`, capped by the time left
    pub fn call_budget(&self, call_timeout: Duration) -> Duration {
        call_timeout.min(self.remaining())
    }

    /// Run `fut` within the call budget; dropping it on expiry cancels the call
    pub async fn run<F, T>(&self, operation: &str, call_timeout: Duration, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let budget = self.call_budget(call_timeout);
        if budget.is_zero() {
            return Err(PipelineError::timeout(operation, 0));
        }
        match timeout(budget, fut).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::timeout(operation, budget.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_budget_capped_by_deadline() {
        let deadline = Deadline::after(Duration::from_millis(50));
        assert!(deadline.call_budget(Duration::from_secs(30)) <= Duration::from_millis(50));
        assert_eq!(deadline.call_budget(Duration::from_millis(1)), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let result: Result<()> = deadline
            .run("sleep", Duration::from_millis(10), async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(PipelineError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_expired_deadline_fails_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        let result = deadline.run("noop", Duration::from_secs(1), async { Ok(1) }).await;
        assert!(matches!(result, Err(PipelineError::Timeout { millis: 0, .. })));
    }
}
