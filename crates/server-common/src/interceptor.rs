//! Response interceptor: wraps successful handler results per transport.
//!
//! The counterpart of the exception filter for the happy path. HTTP and
//! RPC results are wrapped in the success envelope; GraphQL results pass
//! through untouched because the query engine owns its own response
//! shape and must not be double-wrapped.

use serde::Serialize;

use crate::envelope::SuccessBody;
use crate::transport::{
    HttpRequestContext, RpcCallContext, TransportContext, UNKNOWN_TRACE_ID,
};

/// HTTP success rendering: status 200 plus the JSON success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct HttpSuccessResponse<T> {
    pub status: u16,
    pub body: SuccessBody<T>,
}

/// Success rendering for whichever transport carried the request.
#[derive(Debug)]
pub enum SuccessRendering<T> {
    Http(HttpSuccessResponse<T>),
    Rpc(SuccessBody<T>),
    /// Unwrapped passthrough for the query engine.
    Graphql(T),
}

/// Wraps successful handler completion into the transport-appropriate
/// response shape, stamping the timestamp and trace id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterceptor;

impl ResponseInterceptor {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch on the transport kind.
    pub fn wrap<T>(&self, data: T, ctx: &TransportContext) -> SuccessRendering<T> {
        match ctx {
            TransportContext::Http(http) => SuccessRendering::Http(self.wrap_http(data, http)),
            TransportContext::Rpc(rpc) => SuccessRendering::Rpc(self.wrap_rpc(data, rpc)),
            TransportContext::Graphql(_) => SuccessRendering::Graphql(data),
        }
    }

    /// Trace id read from the per-request id slot; `"unknown"` if absent.
    pub fn wrap_http<T>(&self, data: T, ctx: &HttpRequestContext) -> HttpSuccessResponse<T> {
        let trace_id = ctx
            .id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string());
        HttpSuccessResponse {
            status: 200,
            body: SuccessBody::new(data, trace_id),
        }
    }

    /// Trace id read from the call metadata (`x-request-id`, first value).
    pub fn wrap_rpc<T>(&self, data: T, ctx: &RpcCallContext) -> SuccessBody<T> {
        let trace_id = ctx
            .request_id()
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string());
        SuccessBody::new(data, trace_id)
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for HttpSuccessResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status)
            .unwrap_or(axum::http::StatusCode::OK);
        (status, axum::Json(self.body)).into_response()
    }
}
