//! Error code registry.
//!
//! Error codes are stable six-character strings composed as
//! `source (1 letter) + domain (2 digits) + sequence (3 zero-padded digits)`,
//! e.g. `A01001`. The source letter classifies who caused the failure:
//! `A` = user, `B` = system, `C` = third-party downstream.
//!
//! Registries are compiled once at process startup, single-threaded,
//! before any request is served. Any invalid or colliding definition is a
//! fatal [`ConfigurationError`], never a runtime condition. Compiled
//! definitions are read-only for the process lifetime.
//!
//! # Example
//!
//! ```
//! use faultline_server_common::codes::{
//!     define_error_codes, domains, ErrorCodeSpec, ErrorDomain, ErrorSource,
//! };
//!
//! let errors = define_error_codes(
//!     &ErrorDomain::new(domains::AUTH),
//!     &[(
//!         "USERNAME_TAKEN",
//!         ErrorCodeSpec::new(ErrorSource::User, 1, "Username \"%s\" already exists")
//!             .with_status(409),
//!     )],
//! )
//! .unwrap();
//!
//! assert_eq!(errors["USERNAME_TAKEN"].code, "A01001");
//! assert_eq!(errors["USERNAME_TAKEN"].http_status, 409);
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

/// Classification of who caused a failure. Determines the code's leading
/// letter, the default HTTP status, and the log severity policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSource {
    /// Client-caused failure. Warn-logged; message safe to disclose.
    User,
    /// Internal failure. Error-logged; diagnostics gated to non-production.
    System,
    /// Downstream dependency failure. Error-logged.
    ThirdParty,
}

impl ErrorSource {
    /// One-letter wire form used as the first character of a code.
    pub fn letter(self) -> char {
        match self {
            ErrorSource::User => 'A',
            ErrorSource::System => 'B',
            ErrorSource::ThirdParty => 'C',
        }
    }

    /// Parse the leading letter of a composed code.
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'A' => Some(ErrorSource::User),
            'B' => Some(ErrorSource::System),
            'C' => Some(ErrorSource::ThirdParty),
            _ => None,
        }
    }

    /// Default HTTP status when a definition does not specify one.
    pub fn default_http_status(self) -> u16 {
        match self {
            ErrorSource::User => 400,
            ErrorSource::System => 500,
            ErrorSource::ThirdParty => 502,
        }
    }
}

/// Two-digit namespace distinguishing which service or module owns an
/// error code range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDomain {
    domain: String,
}

impl ErrorDomain {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.domain
    }
}

/// Well-known domain namespaces.
pub mod domains {
    pub const COMMON: &str = "00";
    pub const AUTH: &str = "01";
    pub const PAYMENTS: &str = "02";
}

/// Input definition for a single error code.
#[derive(Debug, Clone)]
pub struct ErrorCodeSpec {
    pub source: ErrorSource,
    pub seq: u32,
    pub http_status: Option<u16>,
    pub message: &'static str,
}

impl ErrorCodeSpec {
    pub fn new(source: ErrorSource, seq: u32, message: &'static str) -> Self {
        Self {
            source,
            seq,
            http_status: None,
            message,
        }
    }

    /// Override the HTTP status derived from the source.
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

/// Compiled, immutable error code definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCodeDef {
    /// Composed stable code, e.g. `A01001`.
    pub code: String,
    pub http_status: u16,
    /// User-facing message template; `%s` placeholders are substituted
    /// positionally when an [`crate::AppError`] is raised with args.
    pub message: String,
}

impl ErrorCodeDef {
    /// Source classification parsed back from the code's leading letter.
    pub fn source(&self) -> Option<ErrorSource> {
        self.code.chars().next().and_then(ErrorSource::from_letter)
    }

    /// True for user-sourced (`A`) codes, which are warn-logged and never
    /// carry auto-derived diagnostics.
    pub fn is_user_error(&self) -> bool {
        self.source() == Some(ErrorSource::User)
    }
}

/// Registry definition mistake. Fatal at startup; never reaches request
/// handling.
///
/// Invalid source letters and fractional sequence numbers are
/// unrepresentable here: [`ErrorSource`] is an enum and `seq` is an
/// integer type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("invalid domain \"{domain}\": must be a 2-digit string (e.g. \"00\", \"01\")")]
    InvalidDomain { domain: String },
    #[error("invalid seq {seq} for \"{name}\": must be an integer between 1 and 999")]
    InvalidSeq { name: String, seq: u32 },
    #[error("duplicate error code \"{code}\" found at \"{name}\"")]
    DuplicateCode { code: String, name: String },
    #[error("definition \"{name}\" missing from compiled domain")]
    MissingDefinition { name: String },
}

/// Process-wide registry enforcing code uniqueness across domains.
///
/// Construct once at startup, register every domain, then drop the
/// registry; the compiled maps are what services hold onto.
#[derive(Debug, Default)]
pub struct ErrorCodeRegistry {
    seen: HashSet<String>,
}

impl ErrorCodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile one domain worth of definitions into the registry.
    ///
    /// Validates the domain pattern and each sequence, composes the codes,
    /// and rejects any composed code already present — including codes
    /// registered by an earlier domain.
    pub fn register(
        &mut self,
        domain: &ErrorDomain,
        defs: &[(&str, ErrorCodeSpec)],
    ) -> Result<BTreeMap<String, ErrorCodeDef>, ConfigurationError> {
        if !is_two_digit(domain.as_str()) {
            return Err(ConfigurationError::InvalidDomain {
                domain: domain.as_str().to_string(),
            });
        }

        let mut compiled = BTreeMap::new();
        for (name, spec) in defs {
            if spec.seq < 1 || spec.seq > 999 {
                return Err(ConfigurationError::InvalidSeq {
                    name: (*name).to_string(),
                    seq: spec.seq,
                });
            }

            let code = format!("{}{}{:03}", spec.source.letter(), domain.as_str(), spec.seq);
            if !self.seen.insert(code.clone()) {
                return Err(ConfigurationError::DuplicateCode {
                    code,
                    name: (*name).to_string(),
                });
            }

            compiled.insert(
                (*name).to_string(),
                ErrorCodeDef {
                    code,
                    http_status: spec
                        .http_status
                        .unwrap_or_else(|| spec.source.default_http_status()),
                    message: spec.message.to_string(),
                },
            );
        }

        Ok(compiled)
    }
}

/// Compile a standalone domain of error codes.
///
/// Uniqueness is checked within this call only; use [`ErrorCodeRegistry`]
/// when multiple domains must share one process-wide code space.
pub fn define_error_codes(
    domain: &ErrorDomain,
    defs: &[(&str, ErrorCodeSpec)],
) -> Result<BTreeMap<String, ErrorCodeDef>, ConfigurationError> {
    ErrorCodeRegistry::new().register(domain, defs)
}

fn is_two_digit(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit())
}
