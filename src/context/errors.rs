//! Context core error types.

use thiserror::Error;

/// Errors that can occur while editing the agent's context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A tool with this name already exists in the tool set.
    #[error("tool '{name}' already exists")]
    DuplicateTool { name: String },

    /// The named tool does not exist.
    #[error("unknown tool: '{name}'")]
    UnknownTool { name: String },

    /// The named template does not exist.
    #[error("unknown template: '{name}'")]
    UnknownTemplate { name: String },

    /// A staged file was rejected (wrong MIME type).
    #[error("file '{name}' rejected: {reason}")]
    FileRejected { name: String, reason: String },

    /// The tool editor draft carries validation errors and cannot be saved.
    #[error("validation failed: {reason}")]
    ValidationFailed { reason: String },

    /// An editor operation was invoked with no open editing session.
    #[error("no tool editor session is open")]
    NoEditorSession,
}
