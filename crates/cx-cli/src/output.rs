//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use cx_proto::{Backup, Container, Job, Server, Service, Stack};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Stacks for display.
#[derive(Debug, Clone, Serialize)]
pub struct StackList {
    /// Stacks.
    pub stacks: Vec<Stack>,
}

impl TableDisplay for StackList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.stacks.is_empty() {
            writeln!(writer, "No stacks found")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<24}  {:<12}  {:<20}  {:<8}  {:<32}  {}",
            "NAME", "ENVIRONMENT", "STATUS", "HEALTH", "UID", "LAST ACTIVITY"
        )?;
        writeln!(writer, "{}", "─".repeat(112))?;

        for stack in &self.stacks {
            let last_activity = stack
                .last_activity
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            writeln!(
                writer,
                "{:<24}  {:<12}  {:<20}  {:<8}  {:<32}  {}",
                truncate(&stack.name, 24),
                truncate(&stack.environment, 12),
                stack.status.to_string(),
                stack.health.to_string(),
                stack.uid,
                last_activity
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} stack(s)", self.stacks.len())?;
        Ok(())
    }
}

/// Servers for display.
#[derive(Debug, Clone, Serialize)]
pub struct ServerList {
    /// Servers.
    pub servers: Vec<Server>,
}

impl TableDisplay for ServerList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.servers.is_empty() {
            writeln!(writer, "No servers found")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<20}  {:<16}  {:<24}  {:<12}  {}",
            "NAME", "ADDRESS", "ROLES", "REGION", "UID"
        )?;
        writeln!(writer, "{}", "─".repeat(96))?;

        for server in &self.servers {
            writeln!(
                writer,
                "{:<20}  {:<16}  {:<24}  {:<12}  {}",
                truncate(&server.name, 20),
                server.address.as_deref().unwrap_or("-"),
                truncate(&server.roles.join(","), 24),
                server.region.as_deref().unwrap_or("-"),
                server.uid
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} server(s)", self.servers.len())?;
        Ok(())
    }
}

/// Containers for display.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerList {
    /// Containers.
    pub containers: Vec<Container>,
}

impl TableDisplay for ContainerList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.containers.is_empty() {
            writeln!(writer, "No containers found")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<28}  {:<16}  {:<16}  {:<24}  {}",
            "NAME", "SERVICE", "SERVER", "IMAGE", "UID"
        )?;
        writeln!(writer, "{}", "─".repeat(112))?;

        for container in &self.containers {
            writeln!(
                writer,
                "{:<28}  {:<16}  {:<16}  {:<24}  {}",
                truncate(&container.name, 28),
                truncate(container.service_name.as_deref().unwrap_or("-"), 16),
                truncate(container.server_name.as_deref().unwrap_or("-"), 16),
                truncate(container.image.as_deref().unwrap_or("-"), 24),
                truncate(&container.uid, 12)
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} container(s)", self.containers.len())?;
        Ok(())
    }
}

/// Services for display.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceList {
    /// Services.
    pub services: Vec<Service>,
}

impl TableDisplay for ServiceList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.services.is_empty() {
            writeln!(writer, "No services found")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<24}  {:>10}  {:<8}  {}",
            "NAME", "CONTAINERS", "SOURCE", "IMAGE / GIT REF"
        )?;
        writeln!(writer, "{}", "─".repeat(80))?;

        for service in &self.services {
            let origin = service
                .image
                .as_deref()
                .or(service.git_ref.as_deref())
                .unwrap_or("-");
            writeln!(
                writer,
                "{:<24}  {:>10}  {:<8}  {}",
                truncate(&service.name, 24),
                service.containers.len(),
                service.source_type.as_deref().unwrap_or("-"),
                origin
            )?;
        }

        let containers: usize = self.services.iter().map(|s| s.containers.len()).sum();
        writeln!(writer)?;
        writeln!(
            writer,
            "Total: {} service(s) ({containers} container(s))",
            self.services.len()
        )?;
        Ok(())
    }
}

/// Backups for display.
#[derive(Debug, Clone, Serialize)]
pub struct BackupList {
    /// Backups.
    pub backups: Vec<Backup>,
}

impl TableDisplay for BackupList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.backups.is_empty() {
            writeln!(writer, "No backups found")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:>8}  {:<12}  {:<20}  {:>10}  {:<8}  {}",
            "ID", "TYPE", "DATABASE", "SIZE", "VERIFIED", "CREATED"
        )?;
        writeln!(writer, "{}", "─".repeat(88))?;

        for backup in &self.backups {
            writeln!(
                writer,
                "{:>8}  {:<12}  {:<20}  {:>10}  {:<8}  {}",
                backup.id,
                backup.db_type,
                truncate(&backup.database_name, 20),
                human_size(backup.size),
                if backup.verified { "yes" } else { "no" },
                backup.created_at.format("%Y-%m-%d %H:%M")
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} backup(s)", self.backups.len())?;
        Ok(())
    }
}

/// Jobs for display.
#[derive(Debug, Clone, Serialize)]
pub struct JobList {
    /// Jobs.
    pub jobs: Vec<Job>,
}

/// Type label and detail column of a job.
fn job_columns(job: &Job) -> (&'static str, String) {
    match job {
        Job::Basic(basic) => ("basic", basic.command.clone()),
        Job::DockerHostTask(host) => ("host task", host.task.clone()),
        Job::DockerServiceTask(service) => (
            "service task",
            format!("{}: {}", service.service_name, service.task),
        ),
    }
}

impl TableDisplay for JobList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.jobs.is_empty() {
            writeln!(writer, "No jobs found")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:>6}  {:<20}  {:<12}  {:<14}  {:<10}  {}",
            "ID", "NAME", "TYPE", "CRON", "STATUS", "DETAIL"
        )?;
        writeln!(writer, "{}", "─".repeat(96))?;

        for job in &self.jobs {
            let (kind, detail) = job_columns(job);
            writeln!(
                writer,
                "{:>6}  {:<20}  {:<12}  {:<14}  {:<10}  {}",
                job.id(),
                truncate(job.name(), 20),
                kind,
                job.cron().unwrap_or("-"),
                job.status().unwrap_or("-"),
                truncate(&detail, 40)
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} job(s)", self.jobs.len())?;
        Ok(())
    }
}

/// One profile, without its token.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInfo {
    /// Profile name.
    pub name: String,
    /// API base URL.
    pub api_url: String,
    /// Whether this is the current profile.
    pub current: bool,
}

/// Profiles for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileList {
    /// Profiles.
    pub profiles: Vec<ProfileInfo>,
}

impl TableDisplay for ProfileList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.profiles.is_empty() {
            writeln!(writer, "No profiles configured")?;
            return Ok(());
        }

        writeln!(writer, "  {:<16}  {}", "NAME", "API URL")?;
        writeln!(writer, "{}", "─".repeat(64))?;
        for profile in &self.profiles {
            let marker = if profile.current { "*" } else { " " };
            writeln!(writer, "{marker} {:<16}  {}", profile.name, profile.api_url)?;
        }
        Ok(())
    }
}

/// Simple message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
    /// Whether this is a success message.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    /// Create an informational message.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.success {
            writeln!(writer, "✓ {}", self.message)?;
        } else {
            writeln!(writer, "{}", self.message)?;
        }
        Ok(())
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Format a byte count with a binary unit.
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
