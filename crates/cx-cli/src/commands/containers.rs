//! Container command implementation.

use std::io::Write;

use cx_core::resolve::{find_container, find_server};
use cx_core::{ActionKind, ActionRequest};
use cx_proto::ResourceRef;

use super::run_action;
use crate::cli::ContainerCommands;
use crate::context::Context;
use crate::error::CliError;
use crate::output::ContainerList;

/// Handler for container subcommands.
pub struct ContainersCommand<'a> {
    ctx: &'a Context,
}

impl<'a> ContainersCommand<'a> {
    /// Creates a new container command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the container subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        command: &ContainerCommands,
    ) -> Result<(), CliError> {
        match command {
            ContainerCommands::List { server, .. } => self.list(out, server.as_deref()).await,
            ContainerCommands::Restart { container, .. } => {
                self.lifecycle(out, container, ActionKind::ContainerRestart, "Restarting")
                    .await
            }
            ContainerCommands::Stop { container, .. } => {
                self.lifecycle(out, container, ActionKind::ContainerStop, "Stopping")
                    .await
            }
        }
    }

    async fn list<W: Write>(&self, out: &mut W, server: Option<&str>) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let client = self.ctx.client();
        let server_uid = match server {
            Some(query) => {
                let servers = client.list_servers(&stack.uid).await?;
                Some(find_server(&servers, query, false)?.uid.clone())
            }
            None => None,
        };
        let containers = client.list_containers(&stack.uid, server_uid.as_deref()).await?;
        self.ctx.format().write(out, &ContainerList { containers })
    }

    async fn lifecycle<W: Write>(
        &self,
        out: &mut W,
        query: &str,
        kind: ActionKind,
        verb: &str,
    ) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let containers = self.ctx.client().list_containers(&stack.uid, None).await?;
        let container = find_container(&containers, query)?;

        let request = ActionRequest::new(ResourceRef::container(&stack.uid, &container.uid), kind);
        let label = format!("{verb} {}", container.name);
        run_action(self.ctx, out, &label, request).await
    }
}
