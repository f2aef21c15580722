//! Exception resolver.
//!
//! Classifies any caught failure into a normalized
//! `{code, message, devMessage, status}` tuple and decides log severity.
//! Dispatch is a fixed priority order over the [`CaughtError`] kinds with
//! an explicit default arm.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::CommonErrors;
use crate::codes::ErrorCodeDef;
use crate::exception::AppError;

/// Framework-level transport failure (validation guards, routing, auth
/// layers) carrying a numeric status and the raw response payload.
#[derive(Debug)]
pub struct HttpFailure {
    pub status: u16,
    pub payload: FailurePayload,
}

/// Raw payload attached to a framework or RPC failure.
#[derive(Debug)]
pub enum FailurePayload {
    Text(String),
    Json(Value),
}

/// Downstream RPC failure wrapper.
#[derive(Debug)]
pub struct RpcFailure {
    pub error: FailurePayload,
}

/// Query-language error object: the engine's own message plus optional
/// extension metadata.
#[derive(Debug)]
pub struct GraphqlFailure {
    pub message: String,
    pub extensions: Option<Value>,
}

/// Any failure the router can hand to the filter, ordered by resolution
/// priority. The first matching kind wins; `Unexpected` and `Panic` are
/// the explicit default arms.
#[derive(Debug)]
pub enum CaughtError {
    /// Structured application exception raised by business code.
    App(AppError),
    /// Framework transport exception carrying a numeric status.
    Http(HttpFailure),
    /// Downstream RPC failure wrapper.
    Rpc(RpcFailure),
    /// Query-language error object.
    Graphql(GraphqlFailure),
    /// Unexpected error from anywhere else.
    Unexpected(anyhow::Error),
    /// Non-error value, e.g. a caught panic payload.
    Panic(String),
}

impl CaughtError {
    /// Raw message for the error-severity log line.
    fn raw_message(&self) -> String {
        match self {
            CaughtError::App(err) => err.user_message().to_string(),
            CaughtError::Http(failure) => http_dev_message(&failure.payload)
                .unwrap_or_else(|| format!("HTTP {}", failure.status)),
            CaughtError::Rpc(failure) => match &failure.error {
                FailurePayload::Text(text) => text.clone(),
                FailurePayload::Json(value) => value.to_string(),
            },
            CaughtError::Graphql(failure) => failure.message.clone(),
            CaughtError::Unexpected(err) => err.to_string(),
            CaughtError::Panic(value) => value.clone(),
        }
    }

    /// Stack text for the error-severity log line, where one exists.
    fn stack_text(&self) -> Option<String> {
        match self {
            CaughtError::App(err) => Some(err.stack_text()),
            CaughtError::Unexpected(err) => Some(format!("{err:?}")),
            _ => None,
        }
    }
}

impl fmt::Display for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_message())
    }
}

impl From<AppError> for CaughtError {
    fn from(err: AppError) -> Self {
        CaughtError::App(err)
    }
}

impl From<anyhow::Error> for CaughtError {
    fn from(err: anyhow::Error) -> Self {
        CaughtError::Unexpected(err)
    }
}

/// Normalized resolution of a caught failure. Transient; exists only for
/// the duration of response rendering.
#[derive(Debug, Clone)]
pub struct ResolvedError {
    pub error_code: ErrorCodeDef,
    pub message: String,
    pub dev_message: Option<String>,
    pub status: u16,
}

/// Collaborator logger contract for the resolver's severity policy.
pub trait ExceptionLogger: Send + Sync {
    fn warn(&self, message: &str, context: &str);
    fn error(&self, message: &str, stack: Option<&str>, context: &str);
}

/// Default logger backed by the `tracing` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ExceptionLogger for TracingLogger {
    fn warn(&self, message: &str, context: &str) {
        tracing::warn!(context = context, "{message}");
    }

    fn error(&self, message: &str, stack: Option<&str>, context: &str) {
        match stack {
            Some(stack) => tracing::error!(context = context, stack = stack, "{message}"),
            None => tracing::error!(context = context, "{message}"),
        }
    }
}

/// Polymorphic classification of caught failures against the common
/// catalog, plus the severity-mapped logging side of the same policy.
pub struct ExceptionResolver {
    catalog: CommonErrors,
    logger: Arc<dyn ExceptionLogger>,
}

impl ExceptionResolver {
    pub fn new(catalog: CommonErrors, logger: Arc<dyn ExceptionLogger>) -> Self {
        Self { catalog, logger }
    }

    /// Resolver logging through the default `tracing`-backed logger.
    pub fn with_tracing(catalog: CommonErrors) -> Self {
        Self::new(catalog, Arc::new(TracingLogger))
    }

    pub fn catalog(&self) -> &CommonErrors {
        &self.catalog
    }

    /// Classify a caught failure. Case order is the resolution contract.
    pub fn resolve(&self, caught: &CaughtError) -> ResolvedError {
        match caught {
            // Case 1: structured application exception (transport-agnostic).
            CaughtError::App(err) => {
                // Explicit devMessage always wins. The stack backfill is
                // only for system/third-party sources; user errors must
                // not leak internals for expected conditions.
                let dev_message = err.dev_message().map(str::to_string).or_else(|| {
                    if err.error_code().is_user_error() {
                        None
                    } else {
                        Some(err.stack_text())
                    }
                });
                ResolvedError {
                    error_code: err.error_code().clone(),
                    message: err.user_message().to_string(),
                    dev_message,
                    status: err.status(),
                }
            }
            // Case 2: framework transport exception with a numeric status.
            CaughtError::Http(failure) => {
                let entry = self
                    .catalog
                    .for_status(failure.status)
                    .unwrap_or(&self.catalog.internal_server_error);
                let mut error_code = entry.clone();
                // The original numeric status survives even when the code
                // falls back to INTERNAL_SERVER_ERROR.
                error_code.http_status = failure.status;
                ResolvedError {
                    message: entry.message.clone(),
                    dev_message: http_dev_message(&failure.payload),
                    status: failure.status,
                    error_code,
                }
            }
            // Case 3: downstream RPC failure wrapper.
            CaughtError::Rpc(failure) => {
                let entry = &self.catalog.internal_server_error;
                let dev_message = Some(match &failure.error {
                    FailurePayload::Text(text) => text.clone(),
                    FailurePayload::Json(value) => value.to_string(),
                });
                ResolvedError {
                    error_code: entry.clone(),
                    message: entry.message.clone(),
                    dev_message,
                    status: 500,
                }
            }
            // Case 4: query-language error object.
            CaughtError::Graphql(failure) => {
                let entry = &self.catalog.bad_request;
                let message = if failure.message.is_empty() {
                    entry.message.clone()
                } else {
                    failure.message.clone()
                };
                ResolvedError {
                    error_code: entry.clone(),
                    message,
                    dev_message: failure.extensions.as_ref().map(Value::to_string),
                    status: 400,
                }
            }
            // Case 5: everything else.
            CaughtError::Unexpected(err) => {
                let entry = &self.catalog.internal_server_error;
                ResolvedError {
                    error_code: entry.clone(),
                    message: entry.message.clone(),
                    dev_message: Some(format!("{err:?}")),
                    status: 500,
                }
            }
            CaughtError::Panic(value) => {
                let entry = &self.catalog.internal_server_error;
                ResolvedError {
                    error_code: entry.clone(),
                    message: entry.message.clone(),
                    dev_message: Some(value.clone()),
                    status: 500,
                }
            }
        }
    }

    /// Log a caught failure at the severity its classification implies.
    ///
    /// User-sourced application errors log at warn with just the code and
    /// user message — no stack. Everything else logs at error with the
    /// raw message and stack text. Every line is tagged with the trace id
    /// and a context derived from the code. Fire-and-forget: a logging
    /// failure is never propagated into the request path.
    pub fn log(&self, caught: &CaughtError, error_code: &ErrorCodeDef, trace_id: &str) {
        let context = format!("ExceptionFilter[{}]", error_code.code);

        if let CaughtError::App(err) = caught {
            if error_code.is_user_error() {
                self.logger.warn(
                    &format!("[{trace_id}] {}: {}", error_code.code, err.user_message()),
                    &context,
                );
                return;
            }
        }

        let stack = caught.stack_text();
        self.logger.error(
            &format!("[{trace_id}] {}: {}", error_code.code, caught.raw_message()),
            stack.as_deref(),
            &context,
        );
    }
}

/// devMessage extraction from a framework failure payload: string
/// payloads pass through; object payloads contribute their `message`
/// field, joined with `"; "` when it is an array.
fn http_dev_message(payload: &FailurePayload) -> Option<String> {
    match payload {
        FailurePayload::Text(text) => Some(text.clone()),
        FailurePayload::Json(value) => value.get("message").map(|message| match message {
            Value::Array(items) => items
                .iter()
                .map(value_text)
                .collect::<Vec<_>>()
                .join("; "),
            other => value_text(other),
        }),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::exception::AppError;

    /// Test double recording which severity channel each log call used.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingLogger {
        pub warns: Mutex<Vec<(String, String)>>,
        pub errors: Mutex<Vec<(String, Option<String>, String)>>,
    }

    impl ExceptionLogger for RecordingLogger {
        fn warn(&self, message: &str, context: &str) {
            self.warns
                .lock()
                .unwrap()
                .push((message.to_string(), context.to_string()));
        }

        fn error(&self, message: &str, stack: Option<&str>, context: &str) {
            self.errors.lock().unwrap().push((
                message.to_string(),
                stack.map(str::to_string),
                context.to_string(),
            ));
        }
    }

    fn resolver() -> ExceptionResolver {
        ExceptionResolver::with_tracing(CommonErrors::compile().unwrap())
    }

    fn recording_resolver() -> (ExceptionResolver, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let resolver = ExceptionResolver::new(CommonErrors::compile().unwrap(), logger.clone());
        (resolver, logger)
    }

    #[test]
    fn test_resolves_app_error_not_found() {
        let resolver = resolver();
        let caught =
            CaughtError::App(AppError::new(resolver.catalog().not_found.clone()));

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.error_code.code, "A00004");
        assert_eq!(resolved.message, "Not found");
        assert_eq!(resolved.status, 404);
        assert_eq!(resolved.dev_message, None);
    }

    #[test]
    fn test_resolves_app_error_with_args() {
        let resolver = resolver();
        let code = ErrorCodeDef {
            code: "A01001".to_string(),
            http_status: 409,
            message: "Username \"%s\" already exists".to_string(),
        };
        let caught = CaughtError::App(AppError::new(code).with_args(["john"]));

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.message, "Username \"john\" already exists");
        assert_eq!(resolved.status, 409);
    }

    #[test]
    fn test_app_error_system_source_backfills_stack() {
        let resolver = resolver();
        let caught = CaughtError::App(AppError::new(
            resolver.catalog().internal_server_error.clone(),
        ));

        let resolved = resolver.resolve(&caught);

        let dev = resolved.dev_message.expect("backfilled for system source");
        assert!(dev.contains("AppError[B00001]"));
    }

    #[test]
    fn test_app_error_explicit_dev_message_wins() {
        let resolver = resolver();
        let caught = CaughtError::App(
            AppError::new(resolver.catalog().internal_server_error.clone())
                .with_dev_message("Redis connection refused on port 6379"),
        );

        let resolved = resolver.resolve(&caught);

        assert_eq!(
            resolved.dev_message.as_deref(),
            Some("Redis connection refused on port 6379")
        );
    }

    #[test]
    fn test_app_error_user_source_never_backfills() {
        let resolver = resolver();
        let caught = CaughtError::App(AppError::new(resolver.catalog().bad_request.clone()));

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.dev_message, None);
    }

    #[test]
    fn test_http_failure_mapped_status() {
        let resolver = resolver();
        let caught = CaughtError::Http(HttpFailure {
            status: 404,
            payload: FailurePayload::Text("Cannot GET /missing".to_string()),
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.error_code.code, "A00004");
        assert_eq!(resolved.message, "Not found");
        assert_eq!(resolved.status, 404);
        assert_eq!(resolved.dev_message.as_deref(), Some("Cannot GET /missing"));
    }

    #[test]
    fn test_http_failure_unmapped_status_preserved() {
        let resolver = resolver();
        let caught = CaughtError::Http(HttpFailure {
            status: 418,
            payload: FailurePayload::Text("teapot".to_string()),
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.error_code.code, "B00001");
        assert_eq!(resolved.error_code.http_status, 418);
        assert_eq!(resolved.status, 418);
    }

    #[test]
    fn test_http_failure_object_payload_message_array() {
        let resolver = resolver();
        let caught = CaughtError::Http(HttpFailure {
            status: 400,
            payload: FailurePayload::Json(json!({
                "message": ["name must not be empty", "age must be positive"],
                "error": "Bad Request",
            })),
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(
            resolved.dev_message.as_deref(),
            Some("name must not be empty; age must be positive")
        );
    }

    #[test]
    fn test_http_failure_object_payload_scalar_message() {
        let resolver = resolver();
        let caught = CaughtError::Http(HttpFailure {
            status: 422,
            payload: FailurePayload::Json(json!({"message": "invalid payload"})),
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.dev_message.as_deref(), Some("invalid payload"));
        assert_eq!(resolved.error_code.code, "A00005");
    }

    #[test]
    fn test_http_failure_object_payload_without_message() {
        let resolver = resolver();
        let caught = CaughtError::Http(HttpFailure {
            status: 400,
            payload: FailurePayload::Json(json!({"error": "Bad Request"})),
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.dev_message, None);
    }

    #[test]
    fn test_rpc_failure_text() {
        let resolver = resolver();
        let caught = CaughtError::Rpc(RpcFailure {
            error: FailurePayload::Text("connection reset by peer".to_string()),
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.error_code.code, "B00001");
        assert_eq!(resolved.status, 500);
        assert_eq!(
            resolved.dev_message.as_deref(),
            Some("connection reset by peer")
        );
    }

    #[test]
    fn test_rpc_failure_object_serialized() {
        let resolver = resolver();
        let caught = CaughtError::Rpc(RpcFailure {
            error: FailurePayload::Json(json!({"code": 14, "details": "unavailable"})),
        });

        let resolved = resolver.resolve(&caught);

        // Key ordering of the serialized diagnostic is non-contractual.
        let dev: Value =
            serde_json::from_str(resolved.dev_message.as_deref().unwrap()).unwrap();
        assert_eq!(dev, json!({"code": 14, "details": "unavailable"}));
    }

    #[test]
    fn test_graphql_failure_uses_own_message() {
        let resolver = resolver();
        let caught = CaughtError::Graphql(GraphqlFailure {
            message: "Cannot query field \"nope\"".to_string(),
            extensions: Some(json!({"code": "GRAPHQL_VALIDATION_FAILED"})),
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.error_code.code, "A00001");
        assert_eq!(resolved.status, 400);
        assert_eq!(resolved.message, "Cannot query field \"nope\"");
        let dev: Value =
            serde_json::from_str(resolved.dev_message.as_deref().unwrap()).unwrap();
        assert_eq!(dev, json!({"code": "GRAPHQL_VALIDATION_FAILED"}));
    }

    #[test]
    fn test_graphql_empty_message_falls_back() {
        let resolver = resolver();
        let caught = CaughtError::Graphql(GraphqlFailure {
            message: String::new(),
            extensions: None,
        });

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.message, "Bad request");
        assert_eq!(resolved.dev_message, None);
    }

    #[test]
    fn test_unexpected_error() {
        let resolver = resolver();
        let caught = CaughtError::Unexpected(anyhow::anyhow!("database exploded"));

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.error_code.code, "B00001");
        assert_eq!(resolved.message, "Internal server error");
        assert_eq!(resolved.status, 500);
        assert!(resolved.dev_message.unwrap().contains("database exploded"));
    }

    #[test]
    fn test_panic_payload() {
        let resolver = resolver();
        let caught = CaughtError::Panic("something went wrong".to_string());

        let resolved = resolver.resolve(&caught);

        assert_eq!(resolved.error_code.code, "B00001");
        assert_eq!(resolved.status, 500);
        assert_eq!(
            resolved.dev_message.as_deref(),
            Some("something went wrong")
        );
    }

    #[test]
    fn test_log_user_error_warns_only() {
        let (resolver, logger) = recording_resolver();
        let caught = CaughtError::App(
            AppError::new(resolver.catalog().not_found.clone()),
        );
        let resolved = resolver.resolve(&caught);

        resolver.log(&caught, &resolved.error_code, "trace-001");

        let warns = logger.warns.lock().unwrap();
        let errors = logger.errors.lock().unwrap();
        assert_eq!(warns.len(), 1);
        assert_eq!(errors.len(), 0);
        assert_eq!(warns[0].0, "[trace-001] A00004: Not found");
        assert_eq!(warns[0].1, "ExceptionFilter[A00004]");
    }

    #[test]
    fn test_log_system_error_errors_only_with_stack() {
        let (resolver, logger) = recording_resolver();
        let caught = CaughtError::App(AppError::new(
            resolver.catalog().internal_server_error.clone(),
        ));
        let resolved = resolver.resolve(&caught);

        resolver.log(&caught, &resolved.error_code, "trace-002");

        let warns = logger.warns.lock().unwrap();
        let errors = logger.errors.lock().unwrap();
        assert_eq!(warns.len(), 0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "[trace-002] B00001: Internal server error");
        assert!(errors[0].1.as_deref().unwrap().contains("AppError[B00001]"));
        assert_eq!(errors[0].2, "ExceptionFilter[B00001]");
    }

    #[test]
    fn test_log_third_party_error_uses_error_channel() {
        let (resolver, logger) = recording_resolver();
        let caught = CaughtError::App(AppError::new(
            resolver.catalog().third_party_error.clone(),
        ));
        let resolved = resolver.resolve(&caught);

        resolver.log(&caught, &resolved.error_code, "trace-003");

        assert_eq!(logger.warns.lock().unwrap().len(), 0);
        assert_eq!(logger.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_log_panic_uses_error_channel_without_stack() {
        let (resolver, logger) = recording_resolver();
        let caught = CaughtError::Panic("boom".to_string());
        let resolved = resolver.resolve(&caught);

        resolver.log(&caught, &resolved.error_code, "trace-004");

        let errors = logger.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "[trace-004] B00001: boom");
        assert_eq!(errors[0].1, None);
    }
}
