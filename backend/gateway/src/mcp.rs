//! MCP request envelope and method dispatch.
//!
//! Every outcome, including failures, is reported inside the envelope; the
//! HTTP layer always answers 200.

use kvforge_core::{ToolError, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl McpResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
            }),
            id,
        }
    }
}

/// Handle one MCP request against `tools`.
pub async fn dispatch(tools: &ToolRegistry, request: McpRequest) -> McpResponse {
    let McpRequest { method, params, id } = request;
    match method.as_str() {
        "tools/list" => McpResponse::success(id, json!({ "tools": tools.definitions() })),
        "tools/call" => call_tool(tools, params, id).await,
        other => McpResponse::failure(id, METHOD_NOT_FOUND, format!("Unknown method: {other}")),
    }
}

async fn call_tool(tools: &ToolRegistry, params: Value, id: Option<Value>) -> McpResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return McpResponse::failure(id, INVALID_PARAMS, ToolError::MissingArgument("name").to_string());
    };
    let Some(tool) = tools.get(name) else {
        return McpResponse::failure(id, METHOD_NOT_FOUND, format!("Tool not found: {name}"));
    };

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => json!({}),
        Some(args) => args.clone(),
    };

    let call_id = Uuid::new_v4();
    info!(%call_id, tool = name, "Calling tool");
    match tool.call(arguments).await {
        Ok(result) => {
            info!(%call_id, tool = name, "Tool call complete");
            McpResponse::success(id, result)
        }
        Err(e) => {
            let code = if e.is_invalid_params() {
                INVALID_PARAMS
            } else {
                INTERNAL_ERROR
            };
            warn!(%call_id, tool = name, code, error = %e, "Tool call failed");
            McpResponse::failure(id, code, e.to_string())
        }
    }
}
