//! Action invocation.
//!
//! Every state-changing command goes through [`invoke`]: submit the action,
//! then wait for it with the policy of its family. This is the only place a
//! poll session is started.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::time::Duration;

use cx_proto::{AsyncAction, GenericResult, ResourceRef};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::CoreResult;
use crate::poll::{ActionStatusSource, PollPolicy, Poller};

const MINUTE: u64 = 60;

/// Wait profile shared by a group of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionFamily {
    /// Container and service lifecycle.
    Quick,
    /// Server and stack operations.
    Standard,
    /// Redeploys, backups and slave promotion.
    Long,
    /// Full slave resynchronisation.
    Extended,
}

impl ActionFamily {
    /// Poll policy of the family, with progress markers off.
    #[must_use]
    pub const fn policy(self) -> PollPolicy {
        match self {
            Self::Quick => PollPolicy::fixed(Duration::from_secs(3), Duration::from_secs(10 * MINUTE)),
            Self::Standard => PollPolicy::fixed(Duration::from_secs(5), Duration::from_secs(20 * MINUTE)),
            Self::Long => PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(30 * MINUTE)),
            Self::Extended => {
                PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(120 * MINUTE))
            }
        }
    }
}

/// Every action the CLI can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Redeploy a stack.
    StackRedeploy,
    /// Restart every service of a stack.
    StackRestart,
    /// Reboot a server.
    ServerReboot,
    /// Apply a server setting.
    ServerSettings,
    /// Restart one container.
    ContainerRestart,
    /// Stop one container.
    ContainerStop,
    /// Start a service.
    ServiceStart,
    /// Stop a service.
    ServiceStop,
    /// Pause a service.
    ServicePause,
    /// Resume a paused service.
    ServiceResume,
    /// Restart a service.
    ServiceRestart,
    /// Change the container count of a service.
    ServiceScale,
    /// Take a database backup.
    BackupCreate,
    /// Promote a database slave to master.
    SlavePromote,
    /// Resynchronise a database slave from its master.
    SlaveResync,
    /// Run a job once.
    JobRun,
}

impl ActionKind {
    /// Command name sent to the platform.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::StackRedeploy => "redeploy",
            Self::StackRestart => "restart",
            Self::ServerReboot => "reboot_server",
            Self::ServerSettings => "server_set",
            Self::ContainerRestart => "container_restart",
            Self::ContainerStop => "container_stop",
            Self::ServiceStart => "service_start",
            Self::ServiceStop => "service_stop",
            Self::ServicePause => "service_pause",
            Self::ServiceResume => "service_resume",
            Self::ServiceRestart => "service_restart",
            Self::ServiceScale => "service_scale",
            Self::BackupCreate => "backup_create",
            Self::SlavePromote => "promote_slave_db",
            Self::SlaveResync => "resync_slave_db",
            Self::JobRun => "run_job",
        }
    }

    /// Family deciding how long to wait.
    #[must_use]
    pub const fn family(self) -> ActionFamily {
        match self {
            Self::ContainerRestart
            | Self::ContainerStop
            | Self::ServiceStart
            | Self::ServiceStop
            | Self::ServicePause
            | Self::ServiceResume
            | Self::ServiceRestart => ActionFamily::Quick,
            Self::ServerReboot
            | Self::ServerSettings
            | Self::StackRestart
            | Self::ServiceScale
            | Self::JobRun => ActionFamily::Standard,
            Self::StackRedeploy | Self::BackupCreate | Self::SlavePromote => ActionFamily::Long,
            Self::SlaveResync => ActionFamily::Extended,
        }
    }

    /// Shorthand for `self.family().policy()`.
    #[must_use]
    pub const fn policy(self) -> PollPolicy {
        self.family().policy()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// An action to submit against one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    /// Target resource.
    pub resource: ResourceRef,
    /// What to do.
    pub kind: ActionKind,
    /// Extra command arguments.
    pub params: Map<String, Value>,
}

impl ActionRequest {
    /// A request without parameters.
    #[must_use]
    pub fn new(resource: ResourceRef, kind: ActionKind) -> Self {
        Self {
            resource,
            kind,
            params: Map::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Submits actions to the platform.
pub trait ActionSubmitter: Send + Sync {
    /// Submit `request` and return the initial action record.
    fn submit_action(
        &self,
        request: &ActionRequest,
    ) -> impl Future<Output = CoreResult<AsyncAction>> + Send;
}

/// Submit `request` and wait for it with the policy of its kind.
///
/// # Errors
///
/// Submission errors are returned at once, without polling. Otherwise see
/// [`Poller::wait`].
pub async fn invoke<C, W>(
    client: &C,
    request: &ActionRequest,
    show_progress: bool,
    progress: &mut W,
) -> CoreResult<GenericResult>
where
    C: ActionSubmitter + ActionStatusSource,
    W: Write,
{
    let policy = request.kind.policy().with_progress(show_progress);
    invoke_with_policy(client, request, policy, progress).await
}

/// [`invoke`] with an explicit policy.
///
/// # Errors
///
/// Same as [`invoke`].
pub async fn invoke_with_policy<C, W>(
    client: &C,
    request: &ActionRequest,
    policy: PollPolicy,
    progress: &mut W,
) -> CoreResult<GenericResult>
where
    C: ActionSubmitter + ActionStatusSource,
    W: Write,
{
    debug!(
        resource = %request.resource,
        command = request.kind.command(),
        params = request.params.len(),
        "Submitting action"
    );
    let action = client.submit_action(request).await?;
    info!(
        action_id = %action.id,
        command = request.kind.command(),
        interval_secs = policy.check_interval().as_secs(),
        timeout_secs = policy.timeout().as_secs(),
        "Action submitted"
    );

    Poller::new(policy)
        .wait(client, &request.resource, action, progress)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::poll::tests::{ScriptedSource, pending_action};
    use cx_proto::ActionId;
    use std::sync::Mutex;
    use test_case::test_case;

    struct FakePlatform {
        accept: bool,
        status: ScriptedSource,
        submitted: Mutex<Vec<ActionRequest>>,
    }

    impl FakePlatform {
        fn new(accept: bool, status: ScriptedSource) -> Self {
            Self {
                accept,
                status,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    impl ActionSubmitter for FakePlatform {
        async fn submit_action(&self, request: &ActionRequest) -> CoreResult<AsyncAction> {
            self.submitted.lock().expect("lock").push(request.clone());
            if self.accept {
                Ok(pending_action())
            } else {
                Err(CoreError::Transport("403 forbidden".into()))
            }
        }
    }

    impl ActionStatusSource for FakePlatform {
        async fn fetch_action(&self, resource: &ResourceRef, id: ActionId) -> CoreResult<AsyncAction> {
            self.status.fetch_action(resource, id).await
        }
    }

    fn fast() -> PollPolicy {
        PollPolicy::new(Duration::from_millis(1), Duration::from_secs(1)).expect("valid")
    }

    #[tokio::test]
    async fn submit_error_skips_polling() {
        let platform = FakePlatform::new(false, ScriptedSource::new(pending_action()));
        let request = ActionRequest::new(ResourceRef::stack("stk-1"), ActionKind::StackRedeploy);

        let mut out = Vec::new();
        let err = invoke_with_policy(&platform, &request, fast(), &mut out)
            .await
            .expect_err("rejected");

        assert!(matches!(err, CoreError::Transport(_)));
        assert_eq!(platform.status.calls(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn submits_once_and_polls_to_completion() {
        let done = pending_action().finished(Some(true), Some("redeployed".into()));
        let platform = FakePlatform::new(true, ScriptedSource::new(done).then(Ok(pending_action())));
        let request = ActionRequest::new(
            ResourceRef::service("stk-1", "web"),
            ActionKind::ServiceScale,
        )
        .with_param("group", "web")
        .with_param("count", 3);

        let mut out = Vec::new();
        let result = invoke_with_policy(&platform, &request, fast().with_progress(true), &mut out)
            .await
            .expect("done");

        assert_eq!(result, GenericResult::success(Some("redeployed".into())));
        assert_eq!(platform.status.calls(), 2);
        let submitted = platform.submitted.lock().expect("lock");
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].params["count"], 3);
        assert_eq!(String::from_utf8(out).expect("utf8"), ".. done!\n");
    }

    #[test_case(ActionKind::ContainerRestart, 3, 10 * MINUTE ; "container restart")]
    #[test_case(ActionKind::ServicePause, 3, 10 * MINUTE ; "service pause")]
    #[test_case(ActionKind::ServerReboot, 5, 20 * MINUTE ; "server reboot")]
    #[test_case(ActionKind::ServerSettings, 5, 20 * MINUTE ; "server settings")]
    #[test_case(ActionKind::StackRestart, 5, 20 * MINUTE ; "stack restart")]
    #[test_case(ActionKind::ServiceScale, 5, 20 * MINUTE ; "service scale")]
    #[test_case(ActionKind::JobRun, 5, 20 * MINUTE ; "job run")]
    #[test_case(ActionKind::StackRedeploy, 10, 30 * MINUTE ; "redeploy")]
    #[test_case(ActionKind::BackupCreate, 10, 30 * MINUTE ; "backup")]
    #[test_case(ActionKind::SlavePromote, 10, 30 * MINUTE ; "slave promote")]
    #[test_case(ActionKind::SlaveResync, 10, 120 * MINUTE ; "slave resync")]
    fn policy_per_kind(kind: ActionKind, interval: u64, timeout: u64) {
        let policy = kind.policy();
        assert_eq!(policy.check_interval(), Duration::from_secs(interval));
        assert_eq!(policy.timeout(), Duration::from_secs(timeout));
        assert!(!policy.show_progress());
    }

    #[test]
    fn family_policies_are_valid() {
        for family in [
            ActionFamily::Quick,
            ActionFamily::Standard,
            ActionFamily::Long,
            ActionFamily::Extended,
        ] {
            let policy = family.policy();
            assert!(PollPolicy::new(policy.check_interval(), policy.timeout()).is_ok());
        }
    }
}
