//! # cx-core
//!
//! The engine behind every state-changing `cx` command.
//!
//! - [`resolve`] matches a user-typed name against a live listing.
//! - [`poll`] tracks a submitted [`AsyncAction`](cx_proto::AsyncAction) until
//!   it finishes or the wait budget runs out.
//! - [`action`] is the single entry point commands use to submit an action
//!   and wait for it with the policy of its action family.
//! - [`wait`] watches a freshly created stack build, honouring Ctrl-C.
//! - [`fanout`] runs several lookups concurrently and collects every answer.
//!
//! ```text
//! resolve target ─► action::invoke ─► submit ─► poll::Poller::wait ─► GenericResult
//! ```
//!
//! The crate is transport-agnostic: the REST client implements the traits in
//! [`poll`], [`action`] and [`wait`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod error;
pub mod fanout;
pub mod poll;
pub mod resolve;
pub mod wait;

pub use action::{
    ActionFamily, ActionKind, ActionRequest, ActionSubmitter, invoke, invoke_with_policy,
};
pub use error::{CoreError, CoreResult, ResolveError};
pub use fanout::{LookupReply, collect_all, lookup_all};
pub use poll::{ActionStatusSource, PollPolicy, Poller};
pub use resolve::{Candidate, resolve};
pub use wait::{BuildState, BuildWaitConfig, StackStatusSource, WaitEvent, wait_for_stack_build};
