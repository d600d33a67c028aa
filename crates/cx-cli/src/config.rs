//! Profile configuration.
//!
//! Profiles live in a TOML registry, by default
//! `<config dir>/cx/profiles.toml`:
//!
//! ```toml
//! current = "work"
//!
//! [profiles.work]
//! api_url = "https://app.example.com/api/3"
//! token = "..."
//! ```
//!
//! Command-line flags and `CX_*` environment variables override whatever the
//! selected profile holds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::CliError;

/// Name of the profile used when none is selected.
pub const DEFAULT_PROFILE: &str = "default";

/// Credentials for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// API base URL.
    pub api_url: String,
    /// Bearer token.
    pub token: String,
}

impl Profile {
    /// Validate the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the URL is not http(s).
    pub fn validate(&self) -> Result<(), CliError> {
        if self.token.trim().is_empty() {
            return Err(CliError::Config("token cannot be empty".to_string()));
        }
        parse_api_url(&self.api_url)?;
        Ok(())
    }
}

/// All configured profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRegistry {
    /// Profile used when none is named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    /// Profiles by name.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfileRegistry {
    /// Default registry location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cx").join("profiles.toml"))
    }

    /// Load the registry, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No profile registry, starting empty");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse a registry from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a profile fails validation.
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        let registry: Self = toml::from_str(content)
            .map_err(|e| CliError::Config(format!("invalid TOML: {e}")))?;
        registry.validate()?;
        Ok(registry)
    }

    /// Validate every profile and the current selection.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), CliError> {
        for (name, profile) in &self.profiles {
            match profile.validate() {
                Err(CliError::Config(msg)) => {
                    return Err(CliError::Config(format!("profile '{name}': {msg}")));
                }
                other => other?,
            }
        }
        if let Some(current) = &self.current {
            if !self.profiles.contains_key(current) {
                return Err(CliError::Config(format!(
                    "current profile '{current}' is not defined"
                )));
            }
        }
        Ok(())
    }

    /// Write the registry, creating parent directories.
    ///
    /// The file holds bearer tokens; on unix it is readable by its owner
    /// only, including when it already existed with wider permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CliError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Format(format!("TOML serialization failed: {e}")))?;
        write_private(path, content.as_bytes())?;
        debug!(path = %path.display(), profiles = self.profiles.len(), "Saved profile registry");
        Ok(())
    }

    /// Add or replace a profile. The first profile added becomes current.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid.
    pub fn add(&mut self, name: impl Into<String>, profile: Profile) -> Result<(), CliError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CliError::InvalidArgument("profile name cannot be empty".into()));
        }
        profile.validate()?;
        if self.current.is_none() {
            self.current = Some(name.clone());
        }
        self.profiles.insert(name, profile);
        Ok(())
    }

    /// Make `name` the current profile.
    ///
    /// # Errors
    ///
    /// Returns an error if no such profile exists.
    pub fn use_profile(&mut self, name: &str) -> Result<(), CliError> {
        if !self.profiles.contains_key(name) {
            return Err(CliError::Config(format!("unknown profile '{name}'")));
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    /// The profile to use: the named one, else the current one, else
    /// [`DEFAULT_PROFILE`] if defined.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is given but not defined.
    pub fn select(&self, name: Option<&str>) -> Result<Option<(&str, &Profile)>, CliError> {
        if let Some(name) = name {
            return self
                .profiles
                .get_key_value(name)
                .map(|(k, v)| Some((k.as_str(), v)))
                .ok_or_else(|| CliError::Config(format!("unknown profile '{name}'")));
        }
        let fallback = self.current.as_deref().unwrap_or(DEFAULT_PROFILE);
        Ok(self
            .profiles
            .get_key_value(fallback)
            .map(|(k, v)| (k.as_str(), v)))
    }
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write as _;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

/// Overrides from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides<'a> {
    /// Profile to select.
    pub profile: Option<&'a str>,
    /// API URL replacing the profile's.
    pub api_url: Option<&'a str>,
    /// Token replacing the profile's.
    pub token: Option<&'a str>,
}

/// Effective connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API base URL, always ending in `/`.
    pub api_url: Url,
    /// Bearer token.
    pub token: String,
}

impl Settings {
    /// Merge the registry with overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if no URL or token is available, or the URL is invalid.
    pub fn resolve(registry: &ProfileRegistry, overrides: &Overrides<'_>) -> Result<Self, CliError> {
        let selected = registry.select(overrides.profile)?;
        if let Some((name, _)) = selected {
            debug!(profile = name, "Using profile");
        }

        let api_url = overrides
            .api_url
            .or_else(|| selected.map(|(_, p)| p.api_url.as_str()))
            .ok_or_else(|| {
                CliError::Config("no API URL configured, run `cx profiles add` or pass --api-url".into())
            })?;
        let token = overrides
            .token
            .or_else(|| selected.map(|(_, p)| p.token.as_str()))
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CliError::Config("no token configured, run `cx profiles add` or pass --token".into())
            })?;

        Ok(Self {
            api_url: parse_api_url(api_url)?,
            token: token.to_string(),
        })
    }
}

/// Parse an http(s) base URL, normalising it to end in `/`.
///
/// # Errors
///
/// Returns an error for unparsable URLs and other schemes.
pub fn parse_api_url(raw: &str) -> Result<Url, CliError> {
    let mut url =
        Url::parse(raw).map_err(|e| CliError::Config(format!("invalid API URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::Config(format!(
            "API URL must start with http:// or https://, got '{raw}'"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
