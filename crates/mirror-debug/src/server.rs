//! Line-delimited JSON-RPC server over stdio
//!
//! Methods:
//!
//! | method | params | result |
//! |--------|--------|--------|
//! | `ping` | none | `"pong"` |
//! | `domains/list` | none | sorted domain keys |
//! | `validate` | `{identifier, domain?, deadline_ms?}` | the validation report |
//!
//! A failed session answers with error `-32001` whose `data.reason` is the
//! failure reason (`not_found`, `store_unavailable`, `timeout`).

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use mirror_store::{ItemIdentifier, validate_identifier};
use serde_json::{Value, json};

use crate::protocol::{
    DOMAIN_NOT_FOUND, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, SESSION_FAILED, ValidateParams,
};
use crate::router::ServiceRouter;
use crate::service::ValidationService;
use crate::{Error, Result};

/// Deadline for `validate` requests that do not carry one
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Debug validation server
///
/// # Example
///
/// ```ignore
/// use mirror_debug::{DebugServer, ServiceRouter};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = DebugServer::new(ServiceRouter::new());
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct DebugServer {
    router: Arc<ServiceRouter>,
    default_deadline: Duration,
}

impl DebugServer {
    pub fn new(router: ServiceRouter) -> Self {
        Self {
            router: Arc::new(router),
            default_deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = deadline;
        self
    }

    pub fn router(&self) -> &ServiceRouter {
        &self.router
    }

    /// Serve requests from stdin until it closes.
    pub async fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        tracing::info!(domains = ?self.router.domains(), "Debug server ready, listening on stdio");
        self.serve(stdin.lock(), stdout.lock()).await
    }

    /// Serve line-delimited requests from `input`, answering on `output`.
    pub async fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            match self.handle_message(&line).await {
                Ok(response) if !response.is_empty() => {
                    writeln!(output, "{}", response)?;
                    output.flush()?;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Request failed");
                    let error_response =
                        JsonRpcResponse::error(None, INTERNAL_ERROR, format!("Internal error: {}", e));
                    writeln!(output, "{}", serde_json::to_string(&error_response)?)?;
                    output.flush()?;
                }
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one raw message.
    ///
    /// Returns the serialized response, or an empty string for
    /// notifications (requests without an `id` member).
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                return Ok(serde_json::to_string(&response)?);
            }
        };

        let echoed_id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                let response = JsonRpcResponse::error(
                    echoed_id,
                    INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                );
                return Ok(serde_json::to_string(&response)?);
            }
        };

        let is_notification = request.is_notification();
        let id = request.id.clone();
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Request failed");
                JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {e}"))
            }
        };

        if is_notification {
            return Ok(String::new());
        }
        serde_json::to_string(&response).map_err(Error::from)
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        Ok(match request.method.as_str() {
            "ping" => JsonRpcResponse::success(request.id, json!("pong")),
            "domains/list" => JsonRpcResponse::success(request.id, json!(self.router.domains())),
            "validate" => self.handle_validate(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        })
    }

    async fn handle_validate(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let params: ValidateParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };
        if let Err(e) = validate_identifier(&params.identifier) {
            return Ok(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()));
        }

        let root = ItemIdentifier::new(params.identifier);
        let service = match self.router.route(&root, params.domain.as_deref()) {
            Ok(service) => service,
            Err(Error::DomainNotFound { domain }) => {
                return Ok(JsonRpcResponse::error_with_data(
                    id,
                    DOMAIN_NOT_FOUND,
                    format!("No validation service for domain {domain:?}"),
                    Some(json!({ "domain": domain })),
                ));
            }
            Err(e) => return Err(e),
        };

        let deadline = params
            .deadline_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_deadline);
        tracing::info!(root = %root, deadline_ms = deadline.as_millis() as u64, "Validating");

        let session_root = root.clone();
        let outcome = tokio::task::spawn_blocking(move || service.validate(&session_root, deadline))
            .await
            .map_err(|e| Error::Task(e.to_string()))?;

        Ok(match outcome {
            Ok(report) => JsonRpcResponse::success(id, serde_json::to_value(&report)?),
            Err(failure) => JsonRpcResponse::error_with_data(
                id,
                SESSION_FAILED,
                failure.to_string(),
                Some(json!({
                    "reason": failure.reason,
                    "state": failure.state,
                    "root": failure.root,
                })),
            ),
        })
    }
}
