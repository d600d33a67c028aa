//! Final line of every state-changing command.

use std::io::Write;

use cx_proto::GenericResult;

use crate::error::CliError;
use crate::output::OutputFormat;

/// Line shown for a success without a message.
pub const SUCCESS_TEXT: &str = "Success!";

/// Line shown for a failure without a message.
pub const FAILURE_TEXT: &str = "Failed!";

/// Print the outcome of an action.
///
/// A failure is printed here and then returned as
/// [`CliError::ActionFailed`], which the binary turns into a non-zero exit
/// without printing again.
///
/// # Errors
///
/// [`CliError::ActionFailed`] when the action failed; IO and serialization
/// errors from writing.
pub fn render<W: Write>(
    result: &GenericResult,
    format: &OutputFormat,
    out: &mut W,
) -> Result<(), CliError> {
    let line = result.message.clone().unwrap_or_else(|| {
        if result.succeeded {
            SUCCESS_TEXT.to_string()
        } else {
            FAILURE_TEXT.to_string()
        }
    });

    if format.is_json() {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    if result.succeeded {
        Ok(())
    } else {
        Err(CliError::ActionFailed { message: line })
    }
}
