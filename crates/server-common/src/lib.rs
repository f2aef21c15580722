//! faultline-server-common: shared failure-handling infrastructure.
//!
//! Every failure in the backend — expected business error, framework
//! validation error, downstream RPC failure, or truly unexpected error —
//! resolves to one stable, machine-parsable error code and is rendered
//! consistently regardless of which transport (HTTP, RPC, GraphQL)
//! carried the request.
//!
//! Error codes follow the pattern `source + domain + sequence`:
//! one classification letter (`A` = user, `B` = system, `C` = third-party),
//! two domain digits, three zero-padded sequence digits, e.g. `A01001`.
//!
//! The pieces, leaf-first:
//! - [`codes`]: compiles per-domain definitions into globally unique codes
//! - [`catalog`]: the common error vocabulary and status→code table
//! - [`exception`]: [`AppError`], the structured exception business code raises
//! - [`resolver`]: normalizes any caught failure and decides log severity
//! - [`envelope`] / [`interceptor`] / [`filter`]: transport-appropriate
//!   response rendering with trace id stamping

pub mod catalog;
pub mod codes;
pub mod envelope;
pub mod environment;
pub mod exception;
pub mod filter;
pub mod interceptor;
pub mod resolver;
pub mod transport;

pub use catalog::CommonErrors;
pub use codes::{
    define_error_codes, domains, ConfigurationError, ErrorCodeDef, ErrorCodeRegistry,
    ErrorCodeSpec, ErrorDomain, ErrorSource,
};
pub use envelope::{ErrorBody, RpcErrorBody, SuccessBody};
pub use environment::Environment;
pub use exception::AppError;
pub use filter::{
    AppExceptionFilter, ErrorRendering, GraphqlErrorExtensions, GraphqlRejection,
    HttpErrorResponse, RpcErrorResponse,
};
pub use interceptor::{HttpSuccessResponse, ResponseInterceptor, SuccessRendering};
pub use resolver::{
    CaughtError, ExceptionLogger, ExceptionResolver, FailurePayload, GraphqlFailure,
    HttpFailure, ResolvedError, RpcFailure, TracingLogger,
};
pub use transport::{
    GraphqlRequestContext, HttpRequestContext, RpcCallContext, TransportContext, TransportKind,
};
