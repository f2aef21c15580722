use crate::id::RequestId;

/// Header carrying the request id across transports (HTTP headers, gRPC
/// metadata). Matching is case-insensitive on the reading side.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// RequestIdHeaders reads and writes the propagation header on raw
/// header pairs, for transports without a typed header map.
pub struct RequestIdHeaders;

impl RequestIdHeaders {
    /// Extract the request id from header pairs.
    /// An absent or empty value yields a freshly generated id, so callers
    /// always end up with a usable identifier.
    pub fn from_headers(headers: &[(String, String)]) -> RequestId {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(REQUEST_ID_HEADER))
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
            .map(RequestId::from_string)
            .unwrap_or_default()
    }

    /// Render the header pair to attach to an outbound request or echo on
    /// a response.
    pub fn to_headers(id: &RequestId) -> Vec<(String, String)> {
        vec![(REQUEST_ID_HEADER.to_string(), id.to_string())]
    }
}
