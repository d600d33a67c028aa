//! Platform entities returned by listing calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProtoError;

/// Deployment status of a stack, integer-coded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StackStatus {
    /// Waiting to be picked up.
    Queued,
    /// Deployed.
    Success,
    /// Last deployment failed.
    Failed,
    /// Source analysis in progress.
    Analysing,
    /// Source analysis finished.
    Analysed,
    /// Waiting for a deployment slot.
    QueuedForDeploying,
    /// Deployment in progress.
    Deploying,
    /// Failed and cannot be retried.
    TerminalFailure,
}

impl TryFrom<u8> for StackStatus {
    type Error = ProtoError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Queued,
            1 => Self::Success,
            2 => Self::Failed,
            3 => Self::Analysing,
            4 => Self::Analysed,
            5 => Self::QueuedForDeploying,
            6 => Self::Deploying,
            7 => Self::TerminalFailure,
            code => return Err(ProtoError::UnknownCode { kind: "stack status", code }),
        })
    }
}

impl From<StackStatus> for u8 {
    fn from(status: StackStatus) -> Self {
        match status {
            StackStatus::Queued => 0,
            StackStatus::Success => 1,
            StackStatus::Failed => 2,
            StackStatus::Analysing => 3,
            StackStatus::Analysed => 4,
            StackStatus::QueuedForDeploying => 5,
            StackStatus::Deploying => 6,
            StackStatus::TerminalFailure => 7,
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Success => "deployed",
            Self::Failed => "failed",
            Self::Analysing => "analysing",
            Self::Analysed => "analysed",
            Self::QueuedForDeploying => "queued for deploying",
            Self::Deploying => "deploying",
            Self::TerminalFailure => "terminal failure",
        };
        f.write_str(s)
    }
}

/// Health of a stack, integer-coded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StackHealth {
    /// Not yet known.
    Unknown,
    /// Servers are being built.
    Building,
    /// Some servers are unhealthy.
    Partial,
    /// All servers healthy.
    Ok,
    /// No healthy servers.
    Broken,
}

impl TryFrom<u8> for StackHealth {
    type Error = ProtoError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Unknown,
            1 => Self::Building,
            2 => Self::Partial,
            3 => Self::Ok,
            4 => Self::Broken,
            code => return Err(ProtoError::UnknownCode { kind: "stack health", code }),
        })
    }
}

impl From<StackHealth> for u8 {
    fn from(health: StackHealth) -> Self {
        match health {
            StackHealth::Unknown => 0,
            StackHealth::Building => 1,
            StackHealth::Partial => 2,
            StackHealth::Ok => 3,
            StackHealth::Broken => 4,
        }
    }
}

impl fmt::Display for StackHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Building => "building",
            Self::Partial => "partial",
            Self::Ok => "ok",
            Self::Broken => "broken",
        };
        f.write_str(s)
    }
}

/// A deployed application environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    /// Stack UID.
    pub uid: String,
    /// Stack name.
    pub name: String,
    /// Environment name, e.g. `production`.
    pub environment: String,
    /// Deployment status.
    pub status: StackStatus,
    /// Health.
    pub health: StackHealth,
    /// Git repository.
    #[serde(default)]
    pub git: Option<String>,
    /// Git branch.
    #[serde(default)]
    pub git_branch: Option<String>,
    /// Cloud vendor.
    #[serde(default)]
    pub cloud: Option<String>,
    /// Fully qualified domain name.
    #[serde(default)]
    pub fqdn: Option<String>,
    /// Time of the last recorded activity.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl Stack {
    /// Create a queued stack with the given identity.
    #[must_use]
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            environment: environment.into(),
            status: StackStatus::Queued,
            health: StackHealth::Unknown,
            git: None,
            git_branch: None,
            cloud: None,
            fqdn: None,
            last_activity: None,
        }
    }

    /// Replace status and health.
    #[must_use]
    pub const fn with_state(mut self, status: StackStatus, health: StackHealth) -> Self {
        self.status = status;
        self.health = health;
        self
    }
}

/// A server belonging to a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server UID.
    pub uid: String,
    /// Server name.
    pub name: String,
    /// Public address.
    #[serde(default)]
    pub address: Option<String>,
    /// Roles assigned to the server, e.g. `web`, `mysql`.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Server type, e.g. `web` or `db`.
    #[serde(default)]
    pub server_type: Option<String>,
    /// Region.
    #[serde(default)]
    pub region: Option<String>,
    /// Whether containers run on this server.
    #[serde(default)]
    pub is_docker_host: bool,
}

impl Server {
    /// Create a server with no roles.
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            address: None,
            roles: Vec::new(),
            server_type: None,
            region: None,
            is_docker_host: false,
        }
    }

    /// Add a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Set the public address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// A running container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container UID.
    pub uid: String,
    /// Container name.
    pub name: String,
    /// Server the container runs on.
    #[serde(default)]
    pub server_name: Option<String>,
    /// Service the container belongs to.
    #[serde(default)]
    pub service_name: Option<String>,
    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Start time.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl Container {
    /// Create a container with only its identity set.
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            server_name: None,
            service_name: None,
            image: None,
            started_at: None,
        }
    }
}

/// A service: a named group of containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Containers currently running for the service.
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Where the image comes from (`git` or `image`).
    #[serde(default)]
    pub source_type: Option<String>,
    /// Git ref built for the service.
    #[serde(default)]
    pub git_ref: Option<String>,
    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,
}

/// A database backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    /// Backup identifier.
    pub id: u64,
    /// Database type, e.g. `postgresql`.
    pub db_type: String,
    /// Database name.
    pub database_name: String,
    /// Base name of the backup file.
    #[serde(default)]
    pub file_base: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Whether a restore check passed.
    #[serde(default)]
    pub verified: bool,
    /// When the backup was taken.
    pub created_at: DateTime<Utc>,
}
