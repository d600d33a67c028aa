//! Response wrappers used by every platform endpoint.

use serde::{Deserialize, Serialize};

/// Single-object response: `{"response": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Wrapped payload.
    pub response: T,
}

/// Page information attached to listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Previous page number.
    #[serde(default)]
    pub previous: Option<u32>,
    /// Next page number, absent on the last page.
    #[serde(default)]
    pub next: Option<u32>,
    /// Current page number.
    pub current: u32,
    /// Items per page.
    #[serde(default)]
    pub per_page: u32,
    /// Total items.
    #[serde(default)]
    pub count: u32,
    /// Total pages.
    #[serde(default)]
    pub pages: u32,
}

/// Listing response with optional pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedEnvelope<T> {
    /// Items on this page.
    pub response: Vec<T>,
    /// Page information; absent for unpaged endpoints.
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> PagedEnvelope<T> {
    /// Page to request next, if any.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.pagination.and_then(|p| p.next)
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Short error code.
    pub error: String,
    /// Human-readable description.
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ApiErrorBody {
    /// The most descriptive message available.
    #[must_use]
    pub fn message(&self) -> &str {
        self.error_description.as_deref().unwrap_or(&self.error)
    }
}
