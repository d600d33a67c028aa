//! Server command implementation.

use std::io::Write;

use cx_core::resolve::find_server;
use cx_core::{ActionKind, ActionRequest};
use cx_proto::ResourceRef;

use super::run_action;
use crate::cli::ServerCommands;
use crate::context::Context;
use crate::error::CliError;
use crate::output::ServerList;

/// Handler for server subcommands.
pub struct ServersCommand<'a> {
    ctx: &'a Context,
}

impl<'a> ServersCommand<'a> {
    /// Creates a new server command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the server subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(&self, out: &mut W, command: &ServerCommands) -> Result<(), CliError> {
        match command {
            ServerCommands::List { .. } => self.list(out).await,
            ServerCommands::Reboot {
                server, first_match, ..
            } => self.reboot(out, server, *first_match).await,
            ServerCommands::Set {
                server, key, value, ..
            } => self.set(out, server, key, value).await,
        }
    }

    async fn list<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let servers = self.ctx.client().list_servers(&stack.uid).await?;
        self.ctx.format().write(out, &ServerList { servers })
    }

    async fn reboot<W: Write>(&self, out: &mut W, query: &str, first_match: bool) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let servers = self.ctx.client().list_servers(&stack.uid).await?;
        let server = find_server(&servers, query, first_match)?;

        let request = ActionRequest::new(
            ResourceRef::server(&stack.uid, &server.uid),
            ActionKind::ServerReboot,
        );
        let label = format!("Rebooting {}", server.name);
        run_action(self.ctx, out, &label, request).await
    }

    async fn set<W: Write>(&self, out: &mut W, query: &str, key: &str, value: &str) -> Result<(), CliError> {
        if key.trim().is_empty() {
            return Err(CliError::InvalidArgument("setting name cannot be empty".into()));
        }
        let stack = self.ctx.stack()?;
        let servers = self.ctx.client().list_servers(&stack.uid).await?;
        let server = find_server(&servers, query, false)?;

        let request = ActionRequest::new(
            ResourceRef::server(&stack.uid, &server.uid),
            ActionKind::ServerSettings,
        )
        .with_param("setting", key)
        .with_param("value", value);
        let label = format!("Setting {key} on {}", server.name);
        run_action(self.ctx, out, &label, request).await
    }
}
