//! CLI command implementations.
//!
//! Each submodule implements one command group:
//! - [`stacks`] - Stack listing, redeploy, restart and creation
//! - [`servers`] - Server listing, reboot and settings
//! - [`containers`] - Container listing and lifecycle
//! - [`services`] - Service lifecycle and scaling
//! - [`backups`] - Database backups
//! - [`databases`] - Slave promotion and resync
//! - [`jobs`] - Job listing and runs
//! - [`profiles`] - Account profiles
//!
//! State-changing handlers go through [`run_action`], which submits, waits
//! and renders the outcome.

pub mod backups;
pub mod containers;
pub mod databases;
pub mod jobs;
pub mod profiles;
pub mod servers;
pub mod services;
pub mod stacks;

use std::io::Write;

use cx_core::ActionRequest;

pub use backups::BackupsCommand;
pub use containers::ContainersCommand;
pub use databases::DatabasesCommand;
pub use jobs::JobsCommand;
pub use profiles::ProfilesCommand;
pub use servers::ServersCommand;
pub use services::ServicesCommand;
pub use stacks::StacksCommand;

use crate::context::Context;
use crate::error::CliError;
use crate::render::render;

/// Submit `request`, wait for it and print the outcome.
///
/// In table mode `label` starts the progress line; the poller appends its
/// markers to it.
///
/// # Errors
///
/// Any submit, poll or render error. A failed action is reported as
/// [`CliError::ActionFailed`].
pub async fn run_action<W: Write>(
    ctx: &Context,
    out: &mut W,
    label: &str,
    request: ActionRequest,
) -> Result<(), CliError> {
    let show_progress = ctx.show_progress();
    if show_progress {
        write!(out, "{label}")?;
        out.flush()?;
    }

    let result = match cx_core::invoke(ctx.client(), &request, show_progress, &mut *out).await {
        Ok(result) => result,
        Err(err) => {
            if show_progress {
                writeln!(out)?;
            }
            return Err(err.into());
        }
    };

    render(&result, ctx.format(), out)
}
