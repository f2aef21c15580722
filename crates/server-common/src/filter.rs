//! Exception filter: renders resolved errors per transport.
//!
//! A three-way dispatch keyed on the transport kind — one render function
//! per transport, sharing only the resolver output. The router invokes
//! [`AppExceptionFilter::catch`] with any unhandled failure and the
//! per-transport context.

use serde::Serialize;

use crate::envelope::{ErrorBody, RpcErrorBody};
use crate::environment::Environment;
use crate::resolver::{CaughtError, ExceptionResolver, ResolvedError};
use crate::transport::{
    GraphqlRequestContext, HttpRequestContext, TransportContext, UNKNOWN_TRACE_ID,
};

/// HTTP error rendering: numeric status plus the JSON error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct HttpErrorResponse {
    pub status: u16,
    pub body: ErrorBody,
}

/// RPC error rendering: plain rejection payload for the failure channel.
#[derive(Debug, Clone, Serialize)]
pub struct RpcErrorResponse {
    pub payload: RpcErrorBody,
}

/// GraphQL error rendering: numeric status and structured extensions for
/// the engine's own error mechanism. The engine owns the outer response
/// shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRejection {
    pub status: u16,
    pub message: String,
    pub extensions: GraphqlErrorExtensions,
}

/// Structured extensions attached to a GraphQL rejection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlErrorExtensions {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_message: Option<String>,
}

/// Error rendering for whichever transport carried the request.
#[derive(Debug)]
pub enum ErrorRendering {
    Http(HttpErrorResponse),
    Rpc(RpcErrorResponse),
    Graphql(GraphqlRejection),
}

/// Catches any failure the router hands over, resolves it, logs it at
/// the implied severity, and renders the error body appropriate for the
/// originating transport.
pub struct AppExceptionFilter {
    resolver: ExceptionResolver,
    environment: Environment,
}

impl AppExceptionFilter {
    pub fn new(resolver: ExceptionResolver, environment: Environment) -> Self {
        Self {
            resolver,
            environment,
        }
    }

    /// Dispatch on the transport kind.
    pub fn catch(&self, caught: &CaughtError, ctx: &TransportContext) -> ErrorRendering {
        match ctx {
            TransportContext::Http(http) => ErrorRendering::Http(self.render_http(caught, http)),
            TransportContext::Rpc(_) => ErrorRendering::Rpc(self.render_rpc(caught)),
            TransportContext::Graphql(graphql) => {
                ErrorRendering::Graphql(self.render_graphql(caught, graphql))
            }
        }
    }

    /// Request/response transport: resolver decides the numeric status;
    /// the JSON envelope includes `devMessage` only outside production.
    pub fn render_http(&self, caught: &CaughtError, ctx: &HttpRequestContext) -> HttpErrorResponse {
        let resolved = self.resolver.resolve(caught);
        let trace_id = ctx
            .id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string());

        self.resolver.log(caught, &resolved.error_code, &trace_id);

        let body = ErrorBody::new(
            resolved.error_code.code.clone(),
            resolved.message.clone(),
            self.gated_dev_message(&resolved),
            trace_id,
        );
        HttpErrorResponse {
            status: resolved.status,
            body,
        }
    }

    /// Message/streaming-RPC transport: rejects with a plain payload.
    /// The failure channel carries no per-request id slot, so log lines
    /// are tagged with the transport name instead.
    pub fn render_rpc(&self, caught: &CaughtError) -> RpcErrorResponse {
        let resolved = self.resolver.resolve(caught);

        self.resolver.log(caught, &resolved.error_code, "rpc");

        RpcErrorResponse {
            payload: RpcErrorBody {
                code: resolved.error_code.code.clone(),
                message: resolved.message.clone(),
                status: resolved.status,
                dev_message: self.gated_dev_message(&resolved),
            },
        }
    }

    /// Query-language transport: the engine's error-extension mechanism
    /// carries the structured fields. Trace id is best-effort from the
    /// underlying HTTP context; absence is swallowed.
    pub fn render_graphql(
        &self,
        caught: &CaughtError,
        ctx: &GraphqlRequestContext,
    ) -> GraphqlRejection {
        let resolved = self.resolver.resolve(caught);
        let trace_id = ctx
            .http
            .as_ref()
            .and_then(|http| http.id.as_ref())
            .map(ToString::to_string)
            .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string());

        self.resolver.log(caught, &resolved.error_code, &trace_id);

        GraphqlRejection {
            status: resolved.status,
            message: resolved.message.clone(),
            extensions: GraphqlErrorExtensions {
                code: resolved.error_code.code.clone(),
                dev_message: self.gated_dev_message(&resolved),
            },
        }
    }

    fn gated_dev_message(&self, resolved: &ResolvedError) -> Option<String> {
        if self.environment.is_production() {
            None
        } else {
            resolved.dev_message.clone()
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for HttpErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status)
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self.body)).into_response()
    }
}
