//! Polling of async actions.
//!
//! A submitted action starts out pending. The [`Poller`] re-fetches it at a
//! constant interval until the platform reports it finished, or until the
//! policy's timeout has elapsed. The elapsed time is checked before every
//! sleep, so a session never sleeps past its budget by more than one
//! interval.
//!
//! The loop runs inline on the calling task; the command that started the
//! action is suspended until it returns. Fetches are strictly sequential and
//! are never retried: a transport error ends the session.

use std::future::Future;
use std::io::Write;
use std::time::{Duration, Instant};

use cx_proto::{ActionId, AsyncAction, GenericResult, ResourceRef};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};

/// Source of refreshed action records.
pub trait ActionStatusSource: Send + Sync {
    /// Fetch the current state of action `id` on `resource`.
    fn fetch_action(
        &self,
        resource: &ResourceRef,
        id: ActionId,
    ) -> impl Future<Output = CoreResult<AsyncAction>> + Send;
}

/// Interval, budget and feedback settings for one wait session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    check_interval: Duration,
    timeout: Duration,
    show_progress: bool,
}

impl PollPolicy {
    /// Create a policy, rejecting pairs that could never observe a refresh.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPolicy`] if the interval is zero or not
    /// shorter than the timeout.
    pub fn new(check_interval: Duration, timeout: Duration) -> CoreResult<Self> {
        if check_interval.is_zero() {
            return Err(CoreError::InvalidPolicy("check interval must be positive".into()));
        }
        if check_interval >= timeout {
            return Err(CoreError::InvalidPolicy(format!(
                "check interval {check_interval:?} must be shorter than timeout {timeout:?}"
            )));
        }
        Ok(Self::fixed(check_interval, timeout))
    }

    /// Policy from a static table, already known to be valid.
    pub(crate) const fn fixed(check_interval: Duration, timeout: Duration) -> Self {
        Self {
            check_interval,
            timeout,
            show_progress: false,
        }
    }

    /// Enable or disable progress markers.
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Delay between status fetches.
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Maximum total wait.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether progress markers are written.
    #[must_use]
    pub const fn show_progress(&self) -> bool {
        self.show_progress
    }
}

/// Progress marker written for every pending iteration.
pub const PROGRESS_MARKER: &str = ".";

/// Marker written when the action reaches a terminal state.
pub const DONE_MARKER: &str = " done!";

/// Waits for one action to finish.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    policy: PollPolicy,
}

impl Poller {
    /// Create a poller for the given policy.
    #[must_use]
    pub const fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    #[must_use]
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Wait until `action` finishes.
    ///
    /// Progress markers go to `progress` when the policy asks for them. The
    /// outcome message is carried in the returned result for the renderer.
    ///
    /// # Errors
    ///
    /// [`CoreError::PollTimeout`] when the budget is exhausted while pending;
    /// any error from `source` is returned unchanged.
    pub async fn wait<S, W>(
        &self,
        source: &S,
        resource: &ResourceRef,
        action: AsyncAction,
        progress: &mut W,
    ) -> CoreResult<GenericResult>
    where
        S: ActionStatusSource,
        W: Write,
    {
        let started = Instant::now();
        let mut current = action;
        let mut attempt: u32 = 0;

        loop {
            if let Some(result) = current.outcome() {
                if self.policy.show_progress {
                    writeln!(progress, "{DONE_MARKER}")?;
                    progress.flush()?;
                }
                info!(
                    action_id = %current.id,
                    action = %current.action,
                    succeeded = result.succeeded,
                    message = result.message.as_deref().unwrap_or_default(),
                    "Action finished"
                );
                return Ok(result);
            }

            let elapsed = started.elapsed();
            if elapsed > self.policy.timeout {
                debug!(action_id = %current.id, attempt, "Action timed out");
                return Err(CoreError::PollTimeout {
                    secs: self.policy.timeout.as_secs(),
                });
            }

            if self.policy.show_progress {
                write!(progress, "{PROGRESS_MARKER}")?;
                progress.flush()?;
            }

            tokio::time::sleep(self.policy.check_interval).await;
            current = source.fetch_action(resource, current.id).await?;
            attempt += 1;

            debug!(
                action_id = %current.id,
                attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                pending = current.is_pending(),
                "Polled action"
            );
        }
    }
}
