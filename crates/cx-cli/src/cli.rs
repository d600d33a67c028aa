//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// cx - manage application stacks from the command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "cx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Profile to use instead of the current one.
    #[arg(long, env = "CX_PROFILE")]
    pub profile: Option<String>,

    /// API base URL, overriding the profile.
    #[arg(long, env = "CX_API_URL")]
    pub api_url: Option<String>,

    /// Access token, overriding the profile.
    #[arg(long, env = "CX_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Profile registry file.
    #[arg(long, env = "CX_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Names the stack a command operates on.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StackArgs {
    /// Stack name (prefixes accepted).
    #[arg(short = 's', long = "stack", value_name = "STACK")]
    pub stack: String,

    /// Environment, to tell apart stacks sharing a name.
    #[arg(short = 'e', long = "environment", value_name = "ENV")]
    pub environment: Option<String>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Stack management.
    Stacks {
        /// Stack subcommand to execute.
        #[command(subcommand)]
        command: StackCommands,
    },

    /// Server management.
    Servers {
        /// Server subcommand to execute.
        #[command(subcommand)]
        command: ServerCommands,
    },

    /// Container management.
    Containers {
        /// Container subcommand to execute.
        #[command(subcommand)]
        command: ContainerCommands,
    },

    /// Service management.
    Services {
        /// Service subcommand to execute.
        #[command(subcommand)]
        command: ServiceCommands,
    },

    /// Database backups.
    Backups {
        /// Backup subcommand to execute.
        #[command(subcommand)]
        command: BackupCommands,
    },

    /// Database replication.
    Databases {
        /// Database subcommand to execute.
        #[command(subcommand)]
        command: DatabaseCommands,
    },

    /// Scheduled jobs.
    Jobs {
        /// Job subcommand to execute.
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Account profiles.
    Profiles {
        /// Profile subcommand to execute.
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

impl Commands {
    /// The stack the command operates on, if it names one.
    #[must_use]
    pub const fn stack_target(&self) -> Option<&StackArgs> {
        match self {
            Self::Stacks { command } => match command {
                StackCommands::Redeploy { target, .. } | StackCommands::Restart { target } => {
                    Some(target)
                }
                StackCommands::List { .. } | StackCommands::Create { .. } => None,
            },
            Self::Servers { command } => match command {
                ServerCommands::List { target }
                | ServerCommands::Reboot { target, .. }
                | ServerCommands::Set { target, .. } => Some(target),
            },
            Self::Containers { command } => match command {
                ContainerCommands::List { target, .. }
                | ContainerCommands::Restart { target, .. }
                | ContainerCommands::Stop { target, .. } => Some(target),
            },
            Self::Services { command } => match command {
                ServiceCommands::List { target } => Some(target),
                ServiceCommands::Start(service)
                | ServiceCommands::Stop(service)
                | ServiceCommands::Pause(service)
                | ServiceCommands::Resume(service)
                | ServiceCommands::Restart(service)
                | ServiceCommands::Scale { service, .. } => Some(&service.target),
            },
            Self::Backups { command } => match command {
                BackupCommands::List { target, .. } | BackupCommands::Create { target, .. } => {
                    Some(target)
                }
            },
            Self::Databases { command } => match command {
                DatabaseCommands::PromoteSlave { target, .. }
                | DatabaseCommands::ResyncSlave { target, .. } => Some(target),
            },
            Self::Jobs { command } => match command {
                JobCommands::List { target } | JobCommands::Run { target, .. } => Some(target),
            },
            Self::Profiles { .. } => None,
        }
    }
}

/// Stack subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum StackCommands {
    /// List stacks, optionally only the named ones.
    List {
        /// Stack names to show.
        names: Vec<String>,

        /// Only stacks in this environment.
        #[arg(short = 'e', long)]
        environment: Option<String>,
    },

    /// Redeploy a stack.
    Redeploy {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Git reference to deploy.
        #[arg(long)]
        git_ref: Option<String>,

        /// Only redeploy these services (comma-separated).
        #[arg(long, value_delimiter = ',')]
        services: Vec<String>,
    },

    /// Restart every service of a stack.
    Restart {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,
    },

    /// Create a stack and wait for its first build.
    Create {
        /// Name of the new stack.
        #[arg(long)]
        name: String,

        /// Environment of the new stack.
        #[arg(short = 'e', long)]
        environment: String,

        /// Service definition file.
        #[arg(long, value_name = "FILE")]
        service_yaml: Option<PathBuf>,

        /// Manifest file.
        #[arg(long, value_name = "FILE")]
        manifest_yaml: Option<PathBuf>,

        /// Give up waiting after this many seconds.
        #[arg(long, value_name = "SECS", default_value_t = 3600)]
        timeout: u64,
    },
}

/// Server subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ServerCommands {
    /// List the servers of a stack.
    List {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,
    },

    /// Reboot a server.
    Reboot {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Server name, role or address.
        server: String,

        /// Pick the first match when several servers match.
        #[arg(long)]
        first_match: bool,
    },

    /// Apply a server setting.
    Set {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Server name, role or address.
        server: String,

        /// Setting name.
        key: String,

        /// Setting value.
        value: String,
    },
}

/// Container subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ContainerCommands {
    /// List the containers of a stack.
    List {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Only containers on this server.
        #[arg(long)]
        server: Option<String>,
    },

    /// Restart a container.
    Restart {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Container name or UID.
        container: String,
    },

    /// Stop a container.
    Stop {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Container name or UID.
        container: String,
    },
}

/// Names one service, optionally on one server.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    /// Target stack.
    #[command(flatten)]
    pub target: StackArgs,

    /// Service name.
    pub service: String,

    /// Only on this server.
    #[arg(long)]
    pub server: Option<String>,
}

/// Service subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ServiceCommands {
    /// List the services of a stack.
    List {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,
    },
    /// Start a service.
    Start(ServiceTarget),
    /// Stop a service.
    Stop(ServiceTarget),
    /// Pause a service.
    Pause(ServiceTarget),
    /// Resume a paused service.
    Resume(ServiceTarget),
    /// Restart a service.
    Restart(ServiceTarget),
    /// Set the container count of a service.
    Scale {
        /// Service to scale.
        #[command(flatten)]
        service: ServiceTarget,

        /// Desired number of containers.
        count: u32,
    },
}

/// Backup subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BackupCommands {
    /// List backups.
    List {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Only backups of this database type.
        #[arg(long)]
        db_type: Option<String>,
    },

    /// Take a backup now.
    Create {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Only this database type.
        #[arg(long)]
        db_type: Option<String>,
    },
}

/// Database subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DatabaseCommands {
    /// Promote a slave database server to master.
    PromoteSlave {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Slave server.
        server: String,
    },

    /// Resynchronise a slave database server from its master.
    ResyncSlave {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Slave server.
        server: String,

        /// Database type, when the server runs several.
        #[arg(long = "type", value_name = "TYPE")]
        db_type: Option<String>,
    },
}

/// Job subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum JobCommands {
    /// List the jobs of a stack.
    List {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,
    },

    /// Run a job now.
    Run {
        /// Target stack.
        #[command(flatten)]
        target: StackArgs,

        /// Job name or id.
        job: String,

        /// Argument passed to the job.
        #[arg(long)]
        arg: Option<String>,
    },
}

/// Profile subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommands {
    /// List configured profiles.
    List,

    /// Add or replace a profile.
    Add {
        /// Profile name.
        name: String,

        /// API base URL.
        #[arg(long)]
        api_url: String,

        /// Access token.
        #[arg(long)]
        token: String,
    },

    /// Make a profile current.
    Use {
        /// Profile name.
        name: String,
    },
}
