//! # cx-cli
//!
//! Command-line client for a stack-management platform.
//!
//! Provides commands for:
//! - Listing and redeploying stacks, and creating them with a build wait
//! - Server, container and service lifecycle actions
//! - Database backups and replication
//! - Scheduled jobs
//! - Account profiles
//!
//! # Architecture
//!
//! Every state-changing command submits an action over the REST API and
//! polls it until it finishes, using the machinery in `cx-core`:
//!
//! ```text
//! ┌────────┐  submit / poll   ┌──────────────┐
//! │ cx-cli │◄────────────────►│ platform API │
//! └────────┘     (HTTPS)      └──────────────┘
//! ```
//!
//! A [`context::Context`] carries the client, output format and selected
//! stack through one invocation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod render;

pub use cli::{Cli, Commands, Format, StackArgs};
pub use client::ApiClient;
pub use config::{ProfileRegistry, Settings};
pub use context::Context;
pub use error::CliError;
pub use output::OutputFormat;
