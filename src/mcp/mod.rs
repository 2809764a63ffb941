//! MCP dispatcher: routes JSON-RPC requests by `method` and wraps tool output.

pub mod session;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, JSONRPC_VERSION};
use crate::tools::{Arguments, ToolRegistry};
use session::RequestContext;

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_PING: &str = "ping";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Newest first; the first entry is answered when the client asks for something else.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    protocol_version: Option<String>,
    capabilities: Option<Value>,
    client_info: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl TextContent {
    pub fn new(text: String) -> Self {
        Self { kind: "text", text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallToolResult {
    pub content: Vec<TextContent>,
}

pub struct Dispatcher {
    registry: ToolRegistry,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Parse a raw body and dispatch it. `None` means a notification: nothing to send back.
    pub async fn handle_body(&self, body: &[u8], ctx: &RequestContext) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("Failed to parse JSON-RPC body: {e}");
                return Some(JsonRpcResponse::failure(
                    RequestId::Null,
                    JsonRpcError::parse_error(),
                ));
            }
        };

        // Keep the caller's id, if readable, even when the envelope is malformed.
        let fallback_id = RequestId::of(&value);

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request, ctx).await,
            Err(e) => Some(JsonRpcResponse::failure(
                fallback_id,
                JsonRpcError::invalid_request().with_data(json!({ "message": e.to_string() })),
            )),
        }
    }

    pub async fn handle(&self, request: JsonRpcRequest, ctx: &RequestContext) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                request.id.unwrap_or(RequestId::Null),
                JsonRpcError::invalid_request()
                    .with_data(json!({ "message": "Invalid JSON-RPC version" })),
            ));
        }

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "Received notification, ignoring");
            return None;
        };

        tracing::debug!(method = %request.method, session = %ctx.session_id, "Processing request");

        let response = match request.method.as_str() {
            METHOD_INITIALIZE => JsonRpcResponse::success(id, self.initialize(request.params, ctx)),
            METHOD_PING => JsonRpcResponse::success(id, json!({})),
            METHOD_TOOLS_LIST => JsonRpcResponse::success(id, self.registry.manifest()),
            METHOD_TOOLS_CALL => match self.tools_call(request.params).await {
                Ok(result) => match serde_json::to_value(result) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(e) => JsonRpcResponse::failure(id, JsonRpcError::internal_error(e.to_string())),
                },
                Err(error) => JsonRpcResponse::failure(id, error),
            },
            _ => JsonRpcResponse::failure(id, JsonRpcError::method_not_found()),
        };

        Some(response)
    }

    fn initialize(&self, params: Option<Value>, ctx: &RequestContext) -> Value {
        // Capabilities are optional and a malformed block is not fatal.
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        tracing::info!(
            session = %ctx.session_id,
            resumed = ctx.resumed,
            client = ?params.client_info,
            capabilities = ?params.capabilities,
            "MCP session initialized"
        );

        let protocol_version = params
            .protocol_version
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(&v.as_str()))
            .unwrap_or_else(|| SUPPORTED_PROTOCOL_VERSIONS[0].to_string());

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "Football data tools backed by API-Football: team search, fixtures, form, odds, search and fetch."
        })
    }

    async fn tools_call(&self, params: Option<Value>) -> Result<CallToolResult, JsonRpcError> {
        let params: CallParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .ok_or_else(|| JsonRpcError::invalid_params("tools/call requires params.name"))?;
        self.call_tool(&params.name, params.arguments).await
    }

    /// Run one tool and wrap its text in a result envelope.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<CallToolResult, JsonRpcError> {
        let outcome = match Arguments::from_value(arguments) {
            Ok(arguments) => self.registry.call(name, &arguments).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(text) => Ok(CallToolResult {
                content: vec![TextContent::new(text)],
            }),
            Err(e) => {
                tracing::warn!(tool = %name, "Tool call failed: {e}");
                Err(e.to_jsonrpc_error())
            }
        }
    }
}
