//! Backup command implementation.

use std::io::Write;

use cx_core::{ActionKind, ActionRequest};
use cx_proto::ResourceRef;

use super::run_action;
use crate::cli::BackupCommands;
use crate::context::Context;
use crate::error::CliError;
use crate::output::BackupList;

/// Handler for backup subcommands.
pub struct BackupsCommand<'a> {
    ctx: &'a Context,
}

impl<'a> BackupsCommand<'a> {
    /// Creates a new backup command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the backup subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(&self, out: &mut W, command: &BackupCommands) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        match command {
            BackupCommands::List { db_type, .. } => {
                let mut backups = self
                    .ctx
                    .client()
                    .list_backups(&stack.uid, db_type.as_deref())
                    .await?;
                backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                self.ctx.format().write(out, &BackupList { backups })
            }
            BackupCommands::Create { db_type, .. } => {
                let mut request =
                    ActionRequest::new(ResourceRef::backups(&stack.uid), ActionKind::BackupCreate);
                let label = match db_type {
                    Some(db_type) => {
                        request = request.with_param("db_type", db_type.as_str());
                        format!("Backing up {db_type} on {}", stack.name)
                    }
                    None => format!("Backing up {}", stack.name),
                };
                run_action(self.ctx, out, &label, request).await
            }
        }
    }
}
