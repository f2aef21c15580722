//! Common error vocabulary shared by every service (domain `00`).
//!
//! Compiled once from process entry via [`CommonErrors::compile`]; a
//! failure there is a fatal startup abort. The resolver maps framework
//! HTTP statuses onto these definitions through [`CommonErrors::for_status`].

use std::collections::BTreeMap;

use crate::codes::{
    define_error_codes, domains, ConfigurationError, ErrorCodeDef, ErrorCodeSpec, ErrorDomain,
    ErrorSource,
};

/// The compiled common catalog. Read-only after startup; shared freely.
#[derive(Debug, Clone)]
pub struct CommonErrors {
    pub bad_request: ErrorCodeDef,
    pub unauthorized: ErrorCodeDef,
    pub forbidden: ErrorCodeDef,
    pub not_found: ErrorCodeDef,
    pub validation_failed: ErrorCodeDef,
    pub internal_server_error: ErrorCodeDef,
    pub service_unavailable: ErrorCodeDef,
    pub third_party_error: ErrorCodeDef,
    pub third_party_timeout: ErrorCodeDef,
}

impl CommonErrors {
    /// Compile the catalog. Invoke once at process startup.
    pub fn compile() -> Result<Self, ConfigurationError> {
        let domain = ErrorDomain::new(domains::COMMON);
        let mut defs = define_error_codes(
            &domain,
            &[
                // User errors
                (
                    "BAD_REQUEST",
                    ErrorCodeSpec::new(ErrorSource::User, 1, "Bad request").with_status(400),
                ),
                (
                    "UNAUTHORIZED",
                    ErrorCodeSpec::new(ErrorSource::User, 2, "Unauthorized").with_status(401),
                ),
                (
                    "FORBIDDEN",
                    ErrorCodeSpec::new(ErrorSource::User, 3, "Forbidden").with_status(403),
                ),
                (
                    "NOT_FOUND",
                    ErrorCodeSpec::new(ErrorSource::User, 4, "Not found").with_status(404),
                ),
                (
                    "VALIDATION_FAILED",
                    ErrorCodeSpec::new(ErrorSource::User, 5, "Validation failed").with_status(422),
                ),
                // System errors
                (
                    "INTERNAL_SERVER_ERROR",
                    ErrorCodeSpec::new(ErrorSource::System, 1, "Internal server error")
                        .with_status(500),
                ),
                (
                    "SERVICE_UNAVAILABLE",
                    ErrorCodeSpec::new(ErrorSource::System, 2, "Service unavailable")
                        .with_status(503),
                ),
                // Third-party errors
                (
                    "THIRD_PARTY_ERROR",
                    ErrorCodeSpec::new(ErrorSource::ThirdParty, 1, "Third-party service error")
                        .with_status(502),
                ),
                (
                    "THIRD_PARTY_TIMEOUT",
                    ErrorCodeSpec::new(ErrorSource::ThirdParty, 2, "Third-party service timeout")
                        .with_status(504),
                ),
            ],
        )?;

        Ok(Self {
            bad_request: take(&mut defs, "BAD_REQUEST")?,
            unauthorized: take(&mut defs, "UNAUTHORIZED")?,
            forbidden: take(&mut defs, "FORBIDDEN")?,
            not_found: take(&mut defs, "NOT_FOUND")?,
            validation_failed: take(&mut defs, "VALIDATION_FAILED")?,
            internal_server_error: take(&mut defs, "INTERNAL_SERVER_ERROR")?,
            service_unavailable: take(&mut defs, "SERVICE_UNAVAILABLE")?,
            third_party_error: take(&mut defs, "THIRD_PARTY_ERROR")?,
            third_party_timeout: take(&mut defs, "THIRD_PARTY_TIMEOUT")?,
        })
    }

    /// Closest catalog entry for a framework HTTP status, if mapped.
    /// Unmapped statuses fall back to `internal_server_error` at the
    /// resolver, which preserves the original numeric status.
    pub fn for_status(&self, status: u16) -> Option<&ErrorCodeDef> {
        match status {
            400 => Some(&self.bad_request),
            401 => Some(&self.unauthorized),
            403 => Some(&self.forbidden),
            404 => Some(&self.not_found),
            422 => Some(&self.validation_failed),
            500 => Some(&self.internal_server_error),
            502 => Some(&self.third_party_error),
            503 => Some(&self.service_unavailable),
            504 => Some(&self.third_party_timeout),
            _ => None,
        }
    }
}

fn take(
    defs: &mut BTreeMap<String, ErrorCodeDef>,
    name: &str,
) -> Result<ErrorCodeDef, ConfigurationError> {
    defs.remove(name)
        .ok_or_else(|| ConfigurationError::MissingDefinition {
            name: name.to_string(),
        })
}
