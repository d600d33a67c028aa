//! Per-invocation state handed to every command handler.

use cx_proto::Stack;
use tracing::debug;

use crate::cli::StackArgs;
use crate::client::ApiClient;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Client, output format and the stack the command targets.
///
/// The stack is resolved at most once, at dispatch, and read by the handler
/// through [`Context::stack`].
#[derive(Debug, Clone)]
pub struct Context {
    client: ApiClient,
    format: OutputFormat,
    stack: Option<Stack>,
}

impl Context {
    /// A context with no stack selected.
    #[must_use]
    pub const fn new(client: ApiClient, format: OutputFormat) -> Self {
        Self {
            client,
            format,
            stack: None,
        }
    }

    /// Resolve `target` against the live stack listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails or the name does not resolve.
    pub async fn with_stack(self, target: &StackArgs) -> Result<Self, CliError> {
        let stack = self
            .client
            .find_stack(&target.stack, target.environment.as_deref())
            .await?;
        Ok(self.with_resolved_stack(stack))
    }

    /// Use an already-known stack.
    #[must_use]
    pub fn with_resolved_stack(mut self, stack: Stack) -> Self {
        debug!(stack = %stack.name, uid = %stack.uid, "Stack selected");
        self.stack = Some(stack);
        self
    }

    /// The selected stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the command was dispatched without one.
    pub fn stack(&self) -> Result<&Stack, CliError> {
        self.stack
            .as_ref()
            .ok_or_else(|| CliError::InvalidArgument("no stack selected, pass --stack".into()))
    }

    /// The API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The output format.
    #[must_use]
    pub const fn format(&self) -> &OutputFormat {
        &self.format
    }

    /// Whether progress markers should be written. Off for JSON output.
    #[must_use]
    pub const fn show_progress(&self) -> bool {
        !self.format.is_json()
    }
}
