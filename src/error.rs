//! Error type shared by every tool handler.

use crate::jsonrpc::JsonRpcError;
use thiserror::Error;

pub type ToolResult<T> = Result<T, ToolError>;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("No document found for id '{0}'")]
    DocumentNotFound(String),

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream API error: {0}")]
    Api(String),

    #[error("Unexpected upstream payload: {0}")]
    Payload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Convert to a JSON-RPC error. Upstream failures keep their message text.
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            ToolError::UnknownTool(_) => JsonRpcError::method_not_found(),
            ToolError::MissingArgument(_)
            | ToolError::InvalidArgument { .. }
            | ToolError::DocumentNotFound(_) => JsonRpcError::invalid_params(self.to_string()),
            _ => JsonRpcError::internal_error(self.to_string()),
        }
    }
}
