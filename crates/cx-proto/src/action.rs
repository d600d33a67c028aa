//! Async action records and their outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ResourceType;

/// Opaque handle of a submitted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(u64);

impl ActionId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A server-side operation in progress (or finished).
///
/// The record is pending while `finished_at` is absent. Once the platform
/// sets `finished_at` the record is terminal and never changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncAction {
    /// Handle, unique per submission.
    pub id: ActionId,
    /// Kind of the owning entity.
    pub resource_type: ResourceType,
    /// Identifier of the owning entity.
    pub resource_id: String,
    /// Operation name, e.g. `redeploy`.
    pub action: String,
    /// User that started the action.
    #[serde(default)]
    pub user: Option<String>,
    /// Channel the action was started through.
    #[serde(default)]
    pub started_via: Option<String>,
    /// When the platform accepted the action.
    pub started_at: DateTime<Utc>,
    /// When the action reached a terminal state.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Success bit reported alongside a terminal state.
    #[serde(default)]
    pub finished_success: Option<bool>,
    /// Human-readable outcome.
    #[serde(default)]
    pub finished_message: Option<String>,
}

impl AsyncAction {
    /// Create a pending action started now.
    #[must_use]
    pub fn new(
        id: ActionId,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id,
            resource_type,
            resource_id: resource_id.into(),
            action: action.into(),
            user: None,
            started_via: None,
            started_at: Utc::now(),
            finished_at: None,
            finished_success: None,
            finished_message: None,
        }
    }

    /// Mark the action finished now.
    #[must_use]
    pub fn finished(mut self, success: Option<bool>, message: Option<String>) -> Self {
        self.finished_at = Some(Utc::now());
        self.finished_success = success;
        self.finished_message = message;
        self
    }

    /// Whether the action is still running.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.finished_at.is_none()
    }

    /// The outcome, once the action is terminal.
    ///
    /// A terminal record without a success bit counts as succeeded.
    #[must_use]
    pub fn outcome(&self) -> Option<GenericResult> {
        self.finished_at?;
        Some(GenericResult {
            succeeded: self.finished_success.unwrap_or(true),
            message: self.finished_message.clone().filter(|m| !m.is_empty()),
        })
    }
}

/// Terminal outcome surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResult {
    /// Whether the operation succeeded.
    #[serde(alias = "status")]
    pub succeeded: bool,
    /// Optional message from the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenericResult {
    /// A successful result.
    #[must_use]
    pub fn success(message: Option<String>) -> Self {
        Self {
            succeeded: true,
            message,
        }
    }

    /// A failed result.
    #[must_use]
    pub fn failure(message: Option<String>) -> Self {
        Self {
            succeeded: false,
            message,
        }
    }
}
