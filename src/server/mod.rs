//! Stdio JSON-RPC tool server
//!
//! Requests arrive one per line on stdin. Each request is handled in its own
//! task and every response goes through a single stdout writer, so responses
//! may be written in a different order than requests arrived.

pub mod format;
pub mod protocol;
pub mod tools;

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::error::{AppError, AppResult};
use crate::svn::client::SvnClient;
use crate::svn::executor::{CommandRunner, SvnExecutor};

use protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability,
};
use tools::{ToolResult, get_tool_definitions, handle_tool_call};

pub use tools::ToolDefinition;

pub const SERVER_NAME: &str = "svn-mcp";

/// Exposes the svn query operations as tools over JSON-RPC
pub struct SvnMcpServer<R: CommandRunner = SvnExecutor> {
    client: SvnClient<R>,
}

/// Queue a response for the writer; `false` when it was dropped
fn send_response(tx: &mpsc::UnboundedSender<String>, response: String) -> bool {
    if response.is_empty() {
        return true;
    }
    match tx.send(response) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(bytes = e.0.len(), "Writer closed, dropping response");
            false
        }
    }
}

impl<R: CommandRunner + 'static> SvnMcpServer<R> {
    pub fn new(client: SvnClient<R>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SvnClient<R> {
        &self.client
    }

    /// Serve stdin until it closes, then wait for in-flight requests
    pub async fn run(self: Arc<Self>) -> AppResult<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(response) = rx.recv().await {
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        tracing::info!("Server ready, listening on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                let response = match server.handle_message(&line).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to handle message");
                        let fallback =
                            JsonRpcResponse::error(None, INTERNAL_ERROR, format!("Internal error: {}", e));
                        serde_json::to_string(&fallback).unwrap_or_default()
                    }
                };
                send_response(&tx, response);
            });
        }

        tracing::info!("stdin closed, shutting down");
        drop(tx);

        match writer.await {
            Ok(result) => result?,
            Err(e) => tracing::error!(error = %e, "Writer task failed"),
        }

        Ok(())
    }

    /// Handle one raw message; returns an empty string for notifications
    pub async fn handle_message(&self, message: &str) -> AppResult<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request");
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                return Ok(serde_json::to_string(&response)?);
            }
        };

        tracing::debug!(method = %request.method, "Received request");

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id)?,
            "initialized" | "notifications/initialized" => return Ok(String::new()),
            "tools/list" => self.handle_tools_list(request.id)?,
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Ok(serde_json::to_string(&response)?)
    }

    fn handle_initialize(&self, id: Option<Value>) -> AppResult<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> AppResult<JsonRpcResponse> {
        let tools = serde_json::to_value(get_tool_definitions())?;
        Ok(JsonRpcResponse::success(id, json!({ "tools": tools })))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> AppResult<JsonRpcResponse> {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid tool call: {}", e),
                ));
            }
        };

        let result = match handle_tool_call(&self.client, &params.name, params.arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(AppError::Svn(e)) => {
                tracing::warn!(tool = %params.name, code = e.kind().code(), error = %e, "Tool failed");
                ToolResult::error(format::svn_error(&e))
            }
            Err(e @ (AppError::InvalidArguments(_) | AppError::UnknownTool(_))) => {
                return Ok(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()));
            }
            Err(e) => {
                tracing::error!(tool = %params.name, error = %e, "Tool failed unexpectedly");
                return Ok(JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()));
            }
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }
}
