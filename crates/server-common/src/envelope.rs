//! Response envelopes.
//!
//! Uniform wrapper shapes returned to callers: success carries the
//! handler result, error carries the stable code and user message. Both
//! stamp an ISO-8601 timestamp and the request trace id.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Success envelope: `{success: true, data, timestamp, traceId}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
    pub trace_id: String,
}

impl<T> SuccessBody<T> {
    pub fn new(data: T, trace_id: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            timestamp: iso_timestamp(),
            trace_id: trace_id.into(),
        }
    }
}

/// Error envelope: `{success: false, code, message, devMessage?,
/// timestamp, traceId}`. `devMessage` is rendered only outside
/// production; the filter applies the gate before construction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_message: Option<String>,
    pub timestamp: String,
    pub trace_id: String,
}

impl ErrorBody {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        dev_message: Option<String>,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
            dev_message,
            timestamp: iso_timestamp(),
            trace_id: trace_id.into(),
        }
    }
}

/// RPC rejection payload: `{code, message, status, devMessage?}`.
/// No success flag — the RPC failure channel already signals failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcErrorBody {
    pub code: String,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_message: Option<String>,
}

/// Current time in ISO-8601 form with millisecond precision, UTC.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_shape() {
        let body = SuccessBody::new(vec![1, 2, 3], "trace-001");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["traceId"], "trace-001");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody::new("A00004", "Not found", None, "trace-001");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "A00004");
        assert_eq!(json["message"], "Not found");
        assert_eq!(json["traceId"], "trace-001");
        // devMessage omitted entirely when absent
        assert!(json.get("devMessage").is_none());
    }

    #[test]
    fn test_error_body_with_dev_message() {
        let body = ErrorBody::new(
            "B00001",
            "Internal server error",
            Some("stack text".to_string()),
            "trace-001",
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["devMessage"], "stack text");
    }

    #[test]
    fn test_rpc_error_body_has_no_success_flag() {
        let body = RpcErrorBody {
            code: "B00001".to_string(),
            message: "Internal server error".to_string(),
            status: 500,
            dev_message: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("success").is_none());
        assert_eq!(json["status"], 500);
    }

    #[test]
    fn test_timestamp_parseable() {
        let ts = iso_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }
}
