//! # cx-proto
//!
//! Wire types for the stack management REST API.
//!
//! Every payload the platform returns is wrapped in an [`Envelope`] (or a
//! [`PagedEnvelope`] for listings). Server-side operations are tracked through
//! [`AsyncAction`] records which the CLI re-fetches until they finish.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod entities;
pub mod envelope;
pub mod error;
pub mod job;
pub mod types;

pub use action::{ActionId, AsyncAction, GenericResult};
pub use entities::{Backup, Container, Server, Service, Stack, StackHealth, StackStatus};
pub use envelope::{ApiErrorBody, Envelope, PagedEnvelope, Pagination};
pub use error::ProtoError;
pub use job::{BasicJob, DockerHostTaskJob, DockerServiceTaskJob, Job};
pub use types::{ResourceRef, ResourceType};
