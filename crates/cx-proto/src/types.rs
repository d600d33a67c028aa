//! Resource addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity that owns an async action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A whole stack.
    Stack,
    /// A server within a stack.
    Server,
    /// A running container.
    Container,
    /// A service (group of containers).
    Service,
    /// The database backups of a stack.
    Backup,
    /// A scheduled job.
    Job,
}

impl ResourceType {
    /// The tag used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Server => "server",
            Self::Container => "container",
            Self::Service => "service",
            Self::Backup => "backup",
            Self::Job => "job",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a resource an action can be submitted against.
///
/// Every resource lives inside a stack, so the stack UID is always carried
/// alongside the `(resource_type, resource_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// UID of the owning stack.
    pub stack_uid: String,
    /// Kind of the resource.
    pub resource_type: ResourceType,
    /// Identifier of the resource within its kind.
    pub resource_id: String,
}

impl ResourceRef {
    /// The stack itself.
    #[must_use]
    pub fn stack(stack_uid: impl Into<String>) -> Self {
        let stack_uid = stack_uid.into();
        Self {
            resource_id: stack_uid.clone(),
            stack_uid,
            resource_type: ResourceType::Stack,
        }
    }

    /// A server of the stack.
    #[must_use]
    pub fn server(stack_uid: impl Into<String>, server_uid: impl Into<String>) -> Self {
        Self::nested(stack_uid, ResourceType::Server, server_uid)
    }

    /// A container of the stack.
    #[must_use]
    pub fn container(stack_uid: impl Into<String>, container_uid: impl Into<String>) -> Self {
        Self::nested(stack_uid, ResourceType::Container, container_uid)
    }

    /// A service of the stack, addressed by name.
    #[must_use]
    pub fn service(stack_uid: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self::nested(stack_uid, ResourceType::Service, service_name)
    }

    /// The backup collection of the stack.
    #[must_use]
    pub fn backups(stack_uid: impl Into<String>) -> Self {
        let stack_uid = stack_uid.into();
        Self {
            resource_id: stack_uid.clone(),
            stack_uid,
            resource_type: ResourceType::Backup,
        }
    }

    /// A job of the stack.
    #[must_use]
    pub fn job(stack_uid: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self::nested(stack_uid, ResourceType::Job, job_id)
    }

    fn nested(
        stack_uid: impl Into<String>,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            stack_uid: stack_uid.into(),
            resource_type,
            resource_id: resource_id.into(),
        }
    }

    /// Path segments of the resource, relative to the API root.
    ///
    /// Identifiers are kept whole; callers percent-encode each segment.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        let mut segments = vec!["stacks".to_string(), self.stack_uid.clone()];
        let (collection, id) = match self.resource_type {
            ResourceType::Stack => return segments,
            ResourceType::Backup => ("backups", None),
            ResourceType::Server => ("servers", Some(&self.resource_id)),
            ResourceType::Container => ("containers", Some(&self.resource_id)),
            ResourceType::Service => ("services", Some(&self.resource_id)),
            ResourceType::Job => ("jobs", Some(&self.resource_id)),
        };
        segments.push(collection.to_string());
        segments.extend(id.cloned());
        segments
    }

    /// Path segments of the action collection of the resource.
    #[must_use]
    pub fn action_segments(&self) -> Vec<String> {
        let mut segments = self.segments();
        segments.push("actions".to_string());
        segments
    }

    /// Unencoded REST path of the resource, for display.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments().join("/")
    }

    /// Unencoded REST path of the action collection, for display.
    #[must_use]
    pub fn actions_path(&self) -> String {
        self.action_segments().join("/")
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.resource_type, self.resource_id)
    }
}
