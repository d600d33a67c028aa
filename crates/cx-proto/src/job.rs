//! Scheduled jobs.
//!
//! The platform returns a heterogeneous list where each entry carries a
//! `type` tag naming its job kind.

use serde::{Deserialize, Serialize};

/// A job that runs a shell command on the stack's servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicJob {
    /// Job identifier.
    pub id: u64,
    /// Job name.
    pub name: String,
    /// Cron schedule.
    #[serde(default)]
    pub cron: Option<String>,
    /// Last run status.
    #[serde(default)]
    pub status: Option<String>,
    /// Command to run.
    pub command: String,
}

/// A job that runs a task directly on a docker host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerHostTaskJob {
    /// Job identifier.
    pub id: u64,
    /// Job name.
    pub name: String,
    /// Cron schedule.
    #[serde(default)]
    pub cron: Option<String>,
    /// Last run status.
    #[serde(default)]
    pub status: Option<String>,
    /// Task to run on the host.
    pub task: String,
}

/// A job that runs a task inside a service's container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerServiceTaskJob {
    /// Job identifier.
    pub id: u64,
    /// Job name.
    pub name: String,
    /// Cron schedule.
    #[serde(default)]
    pub cron: Option<String>,
    /// Last run status.
    #[serde(default)]
    pub status: Option<String>,
    /// Service whose image runs the task.
    pub service_name: String,
    /// Task to run.
    pub task: String,
}

/// Any job kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Job {
    /// Shell command job.
    #[serde(rename = "BasicJob")]
    Basic(BasicJob),
    /// Host task job.
    #[serde(rename = "DockerHostTaskJob")]
    DockerHostTask(DockerHostTaskJob),
    /// Service task job.
    #[serde(rename = "DockerServiceTaskJob")]
    DockerServiceTask(DockerServiceTaskJob),
}

impl Job {
    /// Job identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Basic(j) => j.id,
            Self::DockerHostTask(j) => j.id,
            Self::DockerServiceTask(j) => j.id,
        }
    }

    /// Job name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Basic(j) => &j.name,
            Self::DockerHostTask(j) => &j.name,
            Self::DockerServiceTask(j) => &j.name,
        }
    }

    /// Cron schedule.
    #[must_use]
    pub fn cron(&self) -> Option<&str> {
        match self {
            Self::Basic(j) => j.cron.as_deref(),
            Self::DockerHostTask(j) => j.cron.as_deref(),
            Self::DockerServiceTask(j) => j.cron.as_deref(),
        }
    }

    /// Last run status.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Basic(j) => j.status.as_deref(),
            Self::DockerHostTask(j) => j.status.as_deref(),
            Self::DockerServiceTask(j) => j.status.as_deref(),
        }
    }
}
