//! Tool error types.

/// Error returned by a tool invocation.
///
/// Never aborts a run: the executor turns it into a
/// [`ToolResult`](crate::ToolResult) error and the loop continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    /// Human-readable error description.
    pub message: String,
}

impl ToolError {
    /// Creates a new tool error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error for a call naming an unregistered tool.
    pub fn not_found(name: &str) -> Self {
        Self::new(format!("Tool not found: {name}"))
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("invalid arguments: {err}"))
    }
}

/// A tool could not be registered.
///
/// Raised when the registry is built, never while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// A parameter was declared without a type.
    #[error("tool '{tool}': parameter '{param}' has no resolvable type")]
    UnresolvedType {
        /// The tool being registered.
        tool: String,
        /// The untyped parameter.
        param: String,
    },

    /// The same parameter name was declared twice.
    #[error("tool '{tool}': parameter '{param}' is declared more than once")]
    DuplicateParameter {
        /// The tool being registered.
        tool: String,
        /// The repeated parameter.
        param: String,
    },

    /// The tool has an empty name.
    #[error("tool name must not be empty")]
    EmptyName,
}
