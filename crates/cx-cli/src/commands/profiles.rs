//! Profile command implementation.
//!
//! Profiles only touch the local registry file, so these commands run
//! without a client or resolved settings.

use std::io::Write;
use std::path::Path;

use crate::cli::ProfileCommands;
use crate::config::{Profile, ProfileRegistry};
use crate::error::CliError;
use crate::output::{Message, OutputFormat, ProfileInfo, ProfileList};

/// Handler for profile subcommands.
pub struct ProfilesCommand<'a> {
    path: &'a Path,
}

impl<'a> ProfilesCommand<'a> {
    /// Creates a handler for the registry at `path`.
    #[must_use]
    pub const fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Executes the profile subcommand.
    ///
    /// # Errors
    ///
    /// Returns error if the registry cannot be read or written, or the
    /// profile is invalid.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &ProfileCommands,
    ) -> Result<(), CliError> {
        let mut registry = ProfileRegistry::from_file(self.path)?;
        match command {
            ProfileCommands::List => {
                let current = registry.current.as_deref();
                let profiles = registry
                    .profiles
                    .iter()
                    .map(|(name, profile)| ProfileInfo {
                        name: name.clone(),
                        api_url: profile.api_url.clone(),
                        current: current == Some(name.as_str()),
                    })
                    .collect();
                format.write(out, &ProfileList { profiles })
            }
            ProfileCommands::Add {
                name,
                api_url,
                token,
            } => {
                registry.add(
                    name.as_str(),
                    Profile {
                        api_url: api_url.clone(),
                        token: token.clone(),
                    },
                )?;
                registry.save(self.path)?;
                format.write(out, &Message::success(format!("Saved profile '{name}'")))
            }
            ProfileCommands::Use { name } => {
                registry.use_profile(name)?;
                registry.save(self.path)?;
                format.write(out, &Message::success(format!("Now using profile '{name}'")))
            }
        }
    }
}
