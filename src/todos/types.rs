//! Todo records and request payloads.

use serde::{Deserialize, Serialize};

/// Storage-assigned todo identifier.
pub type TodoId = i64;

/// A stored todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub body: Option<String>,
    pub status: bool,
}

impl Todo {
    /// Build the stored record for `id` from a payload.
    pub fn from_input(id: TodoId, input: TodoInput) -> Self {
        Self {
            id,
            title: input.title,
            body: input.body,
            status: input.status,
        }
    }
}

/// Payload accepted by create and update.
///
/// Update replaces every field: an omitted `body` becomes `null`.
/// `id` is server-assigned and rejected along with any other unknown field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub status: bool,
}

impl TodoInput {
    /// Decode a raw request body. The error message is safe to return
    /// to the client.
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }
}
