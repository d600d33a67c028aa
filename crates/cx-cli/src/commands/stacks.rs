//! Stack command implementation.

use std::future::Future;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use cx_core::{
    ActionKind, ActionRequest, BuildWaitConfig, CoreError, WaitEvent, lookup_all,
    wait_for_stack_build,
};
use cx_proto::{ResourceRef, Stack};
use tracing::info;

use super::run_action;
use crate::cli::StackCommands;
use crate::client::NewStack;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{Message, StackList};

/// Handler for stack subcommands.
pub struct StacksCommand<'a> {
    ctx: &'a Context,
}

impl<'a> StacksCommand<'a> {
    /// Creates a new stack command handler.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Executes the stack subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn execute<W: Write>(&self, out: &mut W, command: &StackCommands) -> Result<(), CliError> {
        match command {
            StackCommands::List { names, environment } => {
                self.list(out, names, environment.as_deref()).await
            }
            StackCommands::Redeploy {
                git_ref, services, ..
            } => self.redeploy(out, git_ref.as_deref(), services).await,
            StackCommands::Restart { .. } => self.restart(out).await,
            StackCommands::Create {
                name,
                environment,
                service_yaml,
                manifest_yaml,
                timeout,
            } => {
                let new_stack = NewStack {
                    name: name.clone(),
                    environment: environment.clone(),
                    service_yaml: read_optional(service_yaml.as_deref())?,
                    manifest_yaml: read_optional(manifest_yaml.as_deref())?,
                };
                let config = BuildWaitConfig::default().with_timeout(Duration::from_secs(*timeout));
                self.create(out, &new_stack, &config, interrupted()).await
            }
        }
    }

    async fn list<W: Write>(
        &self,
        out: &mut W,
        names: &[String],
        environment: Option<&str>,
    ) -> Result<(), CliError> {
        let stacks = if names.is_empty() {
            let mut stacks = self.ctx.client().list_stacks().await?;
            if let Some(env) = environment {
                stacks.retain(|s| s.environment.eq_ignore_ascii_case(env));
            }
            stacks
        } else {
            let client = self.ctx.client().clone();
            let environment = environment.map(str::to_string);
            lookup_all(names.to_vec(), move |name| {
                let client = client.clone();
                let environment = environment.clone();
                async move { client.find_stack(&name, environment.as_deref()).await }
            })
            .await?
        };

        self.ctx.format().write(out, &StackList { stacks })
    }

    async fn redeploy<W: Write>(
        &self,
        out: &mut W,
        git_ref: Option<&str>,
        services: &[String],
    ) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let mut request = ActionRequest::new(ResourceRef::stack(&stack.uid), ActionKind::StackRedeploy);
        if let Some(git_ref) = git_ref {
            request = request.with_param("git_ref", git_ref);
        }
        if !services.is_empty() {
            request = request.with_param("services", services.to_vec());
        }
        let label = format!("Redeploying {}", describe(stack));
        run_action(self.ctx, out, &label, request).await
    }

    async fn restart<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let stack = self.ctx.stack()?;
        let request = ActionRequest::new(ResourceRef::stack(&stack.uid), ActionKind::StackRestart);
        let label = format!("Restarting {}", describe(stack));
        run_action(self.ctx, out, &label, request).await
    }

    /// Create a stack and wait for its build, stopping early when `cancel`
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns error if creation fails, or the build fails, times out or is
    /// cancelled.
    pub async fn create<W, C>(
        &self,
        out: &mut W,
        new_stack: &NewStack,
        config: &BuildWaitConfig,
        cancel: C,
    ) -> Result<(), CliError>
    where
        W: Write,
        C: Future<Output = ()>,
    {
        let created = self.ctx.client().create_stack(new_stack).await?;
        info!(uid = %created.uid, name = %created.name, "Stack created");

        let show_progress = self.ctx.show_progress();
        let event = {
            let mut sink = io::sink();
            let mut progress: &mut dyn Write = if show_progress {
                write!(out, "Building {}", describe(&created))?;
                out.flush()?;
                &mut *out
            } else {
                &mut sink
            };
            let event =
                wait_for_stack_build(self.ctx.client(), &created.uid, config, cancel, &mut progress)
                    .await;
            if show_progress {
                writeln!(progress)?;
            }
            event?
        };

        match event {
            WaitEvent::Completed(stack) => {
                let message = format!("Stack {} is {} ({})", describe(&stack), stack.status, stack.health);
                self.ctx.format().write(out, &Message::success(message))
            }
            WaitEvent::Failed(stack) => Err(CoreError::BuildFailed(format!(
                "{} is {} ({})",
                describe(&stack),
                stack.status,
                stack.health
            ))
            .into()),
            WaitEvent::TimedOut => Err(CoreError::PollTimeout {
                secs: config.timeout.as_secs(),
            }
            .into()),
            WaitEvent::Cancelled => Err(CoreError::Cancelled.into()),
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn describe(stack: &Stack) -> String {
    format!("{} ({})", stack.name, stack.environment)
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>, CliError> {
    path.map(|p| {
        std::fs::read_to_string(p).map_err(|e| {
            CliError::InvalidArgument(format!("cannot read '{}': {e}", p.display()))
        })
    })
    .transpose()
}
