//! Service command implementation.

use std::io::Write;

use cx_core::resolve::{find_server, find_service};
use cx_core::{ActionKind, ActionRequest};
use cx_proto::ResourceRef;

use super::run_action;
use crate::cli::{ServiceCommands, ServiceTarget};
use crate::context::Context;
use crate::error::CliError;
use crate::output::ServiceList;

/// Handler for service subcommands.
pub struct ServicesCommand<'a> {
    ctx: &'a Context,
}

impl<'a> ServicesCommand<'a> {
    /// Creates a new service command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the service subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(&self, out: &mut W, command: &ServiceCommands) -> Result<(), CliError> {
        match command {
            ServiceCommands::List { .. } => self.list(out).await,
            ServiceCommands::Start(target) => {
                self.act(out, target, ActionKind::ServiceStart, "Starting", None).await
            }
            ServiceCommands::Stop(target) => {
                self.act(out, target, ActionKind::ServiceStop, "Stopping", None).await
            }
            ServiceCommands::Pause(target) => {
                self.act(out, target, ActionKind::ServicePause, "Pausing", None).await
            }
            ServiceCommands::Resume(target) => {
                self.act(out, target, ActionKind::ServiceResume, "Resuming", None).await
            }
            ServiceCommands::Restart(target) => {
                self.act(out, target, ActionKind::ServiceRestart, "Restarting", None).await
            }
            ServiceCommands::Scale { service, count } => {
                self.act(out, service, ActionKind::ServiceScale, "Scaling", Some(*count))
                    .await
            }
        }
    }

    async fn list<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let services = self.ctx.client().list_services(&stack.uid).await?;
        self.ctx.format().write(out, &ServiceList { services })
    }

    async fn act<W: Write>(
        &self,
        out: &mut W,
        target: &ServiceTarget,
        kind: ActionKind,
        verb: &str,
        count: Option<u32>,
    ) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let client = self.ctx.client();
        let services = client.list_services(&stack.uid).await?;
        let service = find_service(&services, &target.service)?;

        let mut request = ActionRequest::new(ResourceRef::service(&stack.uid, &service.name), kind);
        let mut label = format!("{verb} {}", service.name);
        if let Some(query) = target.server.as_deref() {
            let servers = client.list_servers(&stack.uid).await?;
            let server = find_server(&servers, query, false)?;
            request = request.with_param("server_uid", server.uid.as_str());
            label = format!("{label} on {}", server.name);
        }
        if let Some(count) = count {
            request = request.with_param("count", count);
            label = format!("{label} to {count}");
        }
        run_action(self.ctx, out, &label, request).await
    }
}
