//! faultline-correlation: per-request trace id generation and propagation.
//!
//! Every inbound request is stamped with a correlation identifier —
//! client-supplied via the `x-request-id` header, or a freshly generated
//! UUID v4 — that is echoed back to the caller and attached to every log
//! line and response envelope produced while handling that request. The
//! id is the join key between client-visible `traceId` fields and server
//! logs.

pub mod context;
pub mod id;
#[cfg(feature = "tower-layer")]
pub mod layer;

pub use context::{RequestIdHeaders, REQUEST_ID_HEADER};
pub use id::RequestId;
#[cfg(feature = "tower-layer")]
pub use layer::{RequestIdLayer, RequestIdService};
