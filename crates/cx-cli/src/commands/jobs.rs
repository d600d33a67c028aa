//! Job command implementation.

use std::io::Write;

use cx_core::resolve::find_job;
use cx_core::{ActionKind, ActionRequest};
use cx_proto::ResourceRef;

use super::run_action;
use crate::cli::JobCommands;
use crate::context::Context;
use crate::error::CliError;
use crate::output::JobList;

/// Handler for job subcommands.
pub struct JobsCommand<'a> {
    ctx: &'a Context,
}

impl<'a> JobsCommand<'a> {
    /// Creates a new job command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the job subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(&self, out: &mut W, command: &JobCommands) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let jobs = self.ctx.client().list_jobs(&stack.uid).await?;
        match command {
            JobCommands::List { .. } => self.ctx.format().write(out, &JobList { jobs }),
            JobCommands::Run { job, arg, .. } => {
                let job = find_job(&jobs, job)?;
                let mut request = ActionRequest::new(
                    ResourceRef::job(&stack.uid, job.id().to_string()),
                    ActionKind::JobRun,
                );
                if let Some(arg) = arg {
                    request = request.with_param("job_args", arg.as_str());
                }
                let label = format!("Running {}", job.name());
                run_action(self.ctx, out, &label, request).await
            }
        }
    }
}
