//! Per-transport request context.
//!
//! The router hands the filter and interceptor one of these alongside the
//! raw failure or result. Rendering dispatches on the transport kind; the
//! context carries only what each transport exposes for trace correlation.

use faultline_correlation::{RequestId, REQUEST_ID_HEADER};

/// Fallback trace id when no request context is available. Missing trace
/// context must never fail a response.
pub const UNKNOWN_TRACE_ID: &str = "unknown";

/// Which transport carried the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Http,
    Rpc,
    Graphql,
}

/// HTTP request context: the per-request id slot stamped by the
/// request-id middleware.
#[derive(Debug, Clone, Default)]
pub struct HttpRequestContext {
    pub id: Option<RequestId>,
}

impl HttpRequestContext {
    pub fn new(id: RequestId) -> Self {
        Self { id: Some(id) }
    }
}

/// RPC call context: raw metadata pairs from the call.
#[derive(Debug, Clone, Default)]
pub struct RpcCallContext {
    pub metadata: Vec<(String, String)>,
}

impl RpcCallContext {
    pub fn new(metadata: Vec<(String, String)>) -> Self {
        Self { metadata }
    }

    /// First non-empty `x-request-id` metadata value, if present.
    pub fn request_id(&self) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(REQUEST_ID_HEADER))
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }
}

/// GraphQL request context. The underlying HTTP request may be
/// unavailable in some engine contexts; reading it is best-effort.
#[derive(Debug, Clone, Default)]
pub struct GraphqlRequestContext {
    pub http: Option<HttpRequestContext>,
}

impl GraphqlRequestContext {
    pub fn new(http: HttpRequestContext) -> Self {
        Self { http: Some(http) }
    }
}

/// Context object the router passes alongside the raw failure or result.
#[derive(Debug, Clone)]
pub enum TransportContext {
    Http(HttpRequestContext),
    Rpc(RpcCallContext),
    Graphql(GraphqlRequestContext),
}

impl TransportContext {
    pub fn kind(&self) -> TransportKind {
        match self {
            TransportContext::Http(_) => TransportKind::Http,
            TransportContext::Rpc(_) => TransportKind::Rpc,
            TransportContext::Graphql(_) => TransportKind::Graphql,
        }
    }

    /// Trace id for response stamping. Falls back to `"unknown"` rather
    /// than failing when the slot is missing.
    pub fn trace_id(&self) -> String {
        match self {
            TransportContext::Http(ctx) => ctx
                .id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string()),
            TransportContext::Rpc(ctx) => ctx
                .request_id()
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string()),
            TransportContext::Graphql(ctx) => ctx
                .http
                .as_ref()
                .and_then(|http| http.id.as_ref())
                .map(ToString::to_string)
                .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string()),
        }
    }
}
