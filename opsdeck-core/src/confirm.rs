use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmState {
    Idle,
    Pending,
}

/// Outcome of a resolved confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Confirmed(T),
    Cancelled,
}

/// Two-state gate in front of destructive operations. `arm` starts a pending
/// confirmation and hands out a cancel token; `resolve` waits out the delay
/// racing that token and runs the wrapped operation exactly once on
/// confirmation. The gate returns to idle after either outcome.
pub struct ConfirmationFlow {
    delay: Duration,
    pending: Option<CancellationToken>,
}

impl ConfirmationFlow {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn state(&self) -> ConfirmState {
        if self.pending.is_some() {
            ConfirmState::Pending
        } else {
            ConfirmState::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a pending confirmation. Fails while one is already pending, so
    /// a gate can never be entered twice concurrently. The returned token
    /// cancels the confirmation from any task.
    pub fn arm(&mut self) -> CoreResult<CancellationToken> {
        if self.pending.is_some() {
            return Err(CoreError::validation("A confirmation is already pending"));
        }

        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        Ok(token)
    }

    /// Dismiss the pending confirmation without running the operation.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
            debug!("Pending confirmation dismissed");
        }
    }

    /// Wait out the delay, then run `op`. Cancellation before the delay
    /// elapses leaves `op` untouched; the registries stay as they were.
    pub async fn resolve<T>(&mut self, op: impl FnOnce() -> T) -> CoreResult<Outcome<T>> {
        let Some(token) = self.pending.take() else {
            return Err(CoreError::validation("No confirmation is pending"));
        };

        let outcome = tokio::select! {
            _ = token.cancelled() => Outcome::Cancelled,
            _ = tokio::time::sleep(self.delay) => Outcome::Confirmed(op()),
        };

        Ok(outcome)
    }
}

impl Default for ConfirmationFlow {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRM_DELAY)
    }
}
