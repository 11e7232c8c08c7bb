//! Best-effort "page has settled" wait.

use std::time::Duration;

use rednote_protocols::Page;
use tracing::debug;

const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5);
const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(1200);

/// Waits for a quiet DOM, giving up silently at `max_wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityWaiter {
    pub max_wait: Duration,
    pub quiescence: Duration,
}

impl Default for StabilityWaiter {
    fn default() -> Self {
        Self {
            max_wait: DEFAULT_MAX_WAIT,
            quiescence: DEFAULT_QUIESCENCE,
        }
    }
}

impl StabilityWaiter {
    pub fn new(max_wait: Duration, quiescence: Duration) -> Self {
        Self { max_wait, quiescence }
    }

    /// Default bound with a custom quiet window.
    pub fn with_quiescence(quiescence: Duration) -> Self {
        Self {
            quiescence,
            ..Self::default()
        }
    }

    /// Block until the DOM is quiet for `quiescence` or `max_wait` passes.
    ///
    /// Never fails; page errors are logged and swallowed.
    pub async fn await_stable(&self, page: &dyn Page) {
        let bound = self.max_wait + Duration::from_secs(1);
        match tokio::time::timeout(bound, page.wait_stable(self.max_wait, self.quiescence)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Stability wait ended early: {}", e),
            Err(_) => debug!("Stability wait exceeded {:?}", bound),
        }
    }
}
