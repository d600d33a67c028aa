//! cx binary entrypoint.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cx_cli::cli::{Cli, Commands};
use cx_cli::client::ApiClient;
use cx_cli::commands::{
    BackupsCommand, ContainersCommand, DatabasesCommand, JobsCommand, ProfilesCommand,
    ServersCommand, ServicesCommand, StacksCommand,
};
use cx_cli::config::{Overrides, ProfileRegistry, Settings};
use cx_cli::context::Context;
use cx_cli::error::CliError;
use cx_cli::output::OutputFormat;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Usage errors exit with 2 from here
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn registry_path(cli: &Cli) -> Result<PathBuf, CliError> {
    cli.config
        .clone()
        .or_else(ProfileRegistry::default_path)
        .ok_or_else(|| CliError::Config("cannot locate a configuration directory, pass --config".into()))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let path = registry_path(&cli)?;
    let mut stdout = io::stdout().lock();

    if let Commands::Profiles { command } = &cli.command {
        return ProfilesCommand::new(&path).execute(&mut stdout, &format, command);
    }

    let registry = ProfileRegistry::from_file(&path)?;
    let settings = Settings::resolve(
        &registry,
        &Overrides {
            profile: cli.profile.as_deref(),
            api_url: cli.api_url.as_deref(),
            token: cli.token.as_deref(),
        },
    )?;

    let mut ctx = Context::new(ApiClient::new(&settings)?, format);
    if let Some(target) = cli.command.stack_target() {
        ctx = ctx.with_stack(target).await?;
    }

    match &cli.command {
        Commands::Stacks { command } => {
            let cmd = StacksCommand::new(&ctx);
            cmd.execute(&mut stdout, command).await?;
        }
        Commands::Servers { command } => {
            let cmd = ServersCommand::new(&ctx);
            cmd.execute(&mut stdout, command).await?;
        }
        Commands::Containers { command } => {
            let cmd = ContainersCommand::new(&ctx);
            cmd.execute(&mut stdout, command).await?;
        }
        Commands::Services { command } => {
            let cmd = ServicesCommand::new(&ctx);
            cmd.execute(&mut stdout, command).await?;
        }
        Commands::Backups { command } => {
            let cmd = BackupsCommand::new(&ctx);
            cmd.execute(&mut stdout, command).await?;
        }
        Commands::Databases { command } => {
            let cmd = DatabasesCommand::new(&ctx);
            cmd.execute(&mut stdout, command).await?;
        }
        Commands::Jobs { command } => {
            let cmd = JobsCommand::new(&ctx);
            cmd.execute(&mut stdout, command).await?;
        }
        Commands::Profiles { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_cli::cli::{Format, ServerCommands};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn cli_parses_server_list() {
        let cli = parse(&["cx", "servers", "list", "-s", "web"]);
        assert!(matches!(
            cli.command,
            Commands::Servers {
                command: ServerCommands::List { .. }
            }
        ));
    }

    #[test]
    fn cli_respects_format_flag() {
        let cli = parse(&["cx", "--format", "json", "stacks", "list"]);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn registry_path_prefers_flag() {
        let cli = parse(&["cx", "--config", "/tmp/cx.toml", "stacks", "list"]);
        assert_eq!(
            registry_path(&cli).expect("path"),
            PathBuf::from("/tmp/cx.toml")
        );
    }

    #[tokio::test]
    async fn run_without_credentials_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("profiles.toml");
        let config = config.to_str().expect("utf-8 path");
        let cli = parse(&["cx", "--config", config, "stacks", "list"]);

        let err = run(cli).await.expect_err("no profile configured");
        assert!(matches!(err, CliError::Config(_)));
    }

    #[tokio::test]
    async fn run_with_unreachable_api_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("profiles.toml");
        let config = config.to_str().expect("utf-8 path");
        let cli = parse(&[
            "cx",
            "--config",
            config,
            "--api-url",
            "http://127.0.0.1:9/",
            "--token",
            "t",
            "stacks",
            "list",
        ]);

        let err = run(cli).await.expect_err("nothing listens on port 9");
        assert!(matches!(err, CliError::Transport(_)));
    }
}
