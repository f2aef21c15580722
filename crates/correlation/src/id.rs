use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RequestId is the per-request correlation identifier.
/// Either client-supplied or generated at the edge, it travels with the
/// request and is echoed in responses and log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh RequestId as a UUID v4 in textual form.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Build a RequestId from a client-supplied value.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
