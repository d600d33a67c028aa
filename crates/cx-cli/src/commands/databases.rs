//! Database replication commands.

use std::io::Write;

use cx_core::resolve::find_server;
use cx_core::{ActionKind, ActionRequest};
use cx_proto::ResourceRef;

use super::run_action;
use crate::cli::DatabaseCommands;
use crate::context::Context;
use crate::error::CliError;

/// Handler for database subcommands.
pub struct DatabasesCommand<'a> {
    ctx: &'a Context,
}

impl<'a> DatabasesCommand<'a> {
    /// Creates a new database command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the database subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(
        &self,
        out: &mut W,
        command: &DatabaseCommands,
    ) -> Result<(), CliError> {
        let (query, kind, db_type) = match command {
            DatabaseCommands::PromoteSlave { server, .. } => (server, ActionKind::SlavePromote, None),
            DatabaseCommands::ResyncSlave { server, db_type, .. } => {
                (server, ActionKind::SlaveResync, db_type.as_deref())
            }
        };

        let stack = self.ctx.stack()?;
        let servers = self.ctx.client().list_servers(&stack.uid).await?;
        let server = find_server(&servers, query, false)?;

        let mut request = ActionRequest::new(ResourceRef::server(&stack.uid, &server.uid), kind);
        if let Some(db_type) = db_type {
            request = request.with_param("db_type", db_type);
        }
        let label = match kind {
            ActionKind::SlavePromote => format!("Promoting {} to master", server.name),
            _ => format!("Resyncing {}", server.name),
        };
        run_action(self.ctx, out, &label, request).await
    }
}
