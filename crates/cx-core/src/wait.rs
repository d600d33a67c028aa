//! Waiting for a new stack to finish building.
//!
//! The wait multiplexes four sources in one `select!` loop: an external
//! cancel future (Ctrl-C in the binary), a one-shot overall deadline, a
//! status-check interval and a faster visual-feedback interval. Cancel and
//! deadline are polled first so they win over a tick that is ready at the
//! same time.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use cx_proto::{Stack, StackHealth, StackStatus};
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at, sleep};
use tracing::{debug, info, warn};

use crate::error::CoreResult;

/// Source of refreshed stack records.
pub trait StackStatusSource: Send + Sync {
    /// Fetch the stack with the given UID.
    fn fetch_stack(&self, uid: &str) -> impl Future<Output = CoreResult<Stack>> + Send;
}

/// Timing of a build wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildWaitConfig {
    /// Delay between status fetches.
    pub status_interval: Duration,
    /// Delay between progress markers.
    pub feedback_interval: Duration,
    /// Overall budget.
    pub timeout: Duration,
}

impl Default for BuildWaitConfig {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_secs(10),
            feedback_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(3600),
        }
    }
}

impl BuildWaitConfig {
    /// Replace the overall budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Where a stack build stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Still analysing, queued or deploying.
    Building,
    /// Deployed and healthy, or analysed.
    Succeeded,
    /// Deployment failed or the stack is broken.
    Failed,
}

impl BuildState {
    /// Classify a stack record.
    #[must_use]
    pub const fn of(stack: &Stack) -> Self {
        match (stack.status, stack.health) {
            (StackStatus::Failed | StackStatus::TerminalFailure, _) | (_, StackHealth::Broken) => {
                Self::Failed
            }
            (StackStatus::Success, StackHealth::Ok | StackHealth::Partial)
            | (StackStatus::Analysed, _) => Self::Succeeded,
            _ => Self::Building,
        }
    }
}

/// How a build wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitEvent {
    /// The build succeeded.
    Completed(Stack),
    /// The build failed.
    Failed(Stack),
    /// The overall budget ran out.
    TimedOut,
    /// The cancel future resolved first.
    Cancelled,
}

/// Wait for the stack `uid` to leave the building state.
///
/// # Errors
///
/// A failed status fetch or progress write ends the wait with that error.
pub async fn wait_for_stack_build<S, C, W>(
    source: &S,
    uid: &str,
    config: &BuildWaitConfig,
    cancel: C,
    progress: &mut W,
) -> CoreResult<WaitEvent>
where
    S: StackStatusSource,
    C: Future<Output = ()>,
    W: Write,
{
    let deadline = sleep(config.timeout);
    tokio::pin!(deadline);
    tokio::pin!(cancel);

    let mut status_tick = interval(config.status_interval);
    status_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut feedback_tick = interval_at(
        Instant::now() + config.feedback_interval,
        config.feedback_interval,
    );

    let mut last_status = None;

    loop {
        tokio::select! {
            biased;

            () = &mut cancel => {
                warn!(stack = uid, "Build wait interrupted");
                return Ok(WaitEvent::Cancelled);
            }

            () = &mut deadline => {
                warn!(stack = uid, timeout_secs = config.timeout.as_secs(), "Build wait timed out");
                return Ok(WaitEvent::TimedOut);
            }

            _ = status_tick.tick() => {
                let stack = source.fetch_stack(uid).await?;
                if last_status != Some(stack.status) {
                    info!(stack = uid, status = %stack.status, health = %stack.health, "Stack status changed");
                    last_status = Some(stack.status);
                }
                match BuildState::of(&stack) {
                    BuildState::Building => debug!(stack = uid, "Still building"),
                    BuildState::Succeeded => return Ok(WaitEvent::Completed(stack)),
                    BuildState::Failed => return Ok(WaitEvent::Failed(stack)),
                }
            }

            _ = feedback_tick.tick() => {
                write!(progress, ".")?;
                progress.flush()?;
            }
        }
    }
}
