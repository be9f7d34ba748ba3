//! kvforge gateway: HTTP surface over the compression and routing crates.
//!
//! `GET /health` reports liveness; `POST /mcp` carries MCP `tools/list` and
//! `tools/call` requests.

pub mod args;
pub mod health_api;
pub mod mcp;
pub mod server;
pub mod tools;

pub use mcp::{dispatch, McpError, McpRequest, McpResponse};
pub use server::{build_router, start_server, GatewayState};
pub use tools::default_tools;
