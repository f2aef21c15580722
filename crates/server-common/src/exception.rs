//! Structured application exception.
//!
//! Business code raises [`AppError`] for anticipated failure conditions.
//! The error is constructed at the throw site, consumed exactly once by
//! the resolver, and never retained past the failing request.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use crate::codes::ErrorCodeDef;

/// A typed failure carrying a stable error code identity, the
/// interpolated user-facing message, an optional internal diagnostic,
/// and an optional causal chain.
#[derive(Debug)]
pub struct AppError {
    error_code: ErrorCodeDef,
    user_message: String,
    dev_message: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
    backtrace: Backtrace,
}

impl AppError {
    /// Construct from a compiled error code definition. The user message
    /// starts as the code's template; see [`AppError::with_args`].
    pub fn new(error_code: ErrorCodeDef) -> Self {
        Self {
            user_message: error_code.message.clone(),
            error_code,
            dev_message: None,
            source: None,
            backtrace: Backtrace::capture(),
        }
    }

    /// Substitute `%s` placeholders in the code's message template,
    /// left to right. Unmatched trailing placeholders stay literal;
    /// surplus arguments are dropped silently.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        self.user_message = interpolate(&self.error_code.message, &args);
        self
    }

    /// Attach an internal diagnostic. Never disclosed in production, and
    /// always wins over the resolver's auto-derived stack text.
    pub fn with_dev_message(mut self, dev_message: impl Into<String>) -> Self {
        self.dev_message = Some(dev_message.into());
        self
    }

    /// Attach the causal error for diagnostics. Not serialized to clients.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn error_code(&self) -> &ErrorCodeDef {
        &self.error_code
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn dev_message(&self) -> Option<&str> {
        self.dev_message.as_deref()
    }

    /// HTTP status associated with the error code, for transports that
    /// need a single numeric status even off the HTTP path.
    pub fn status(&self) -> u16 {
        self.error_code.http_status
    }

    /// Diagnostic text used when the resolver backfills `devMessage` for
    /// system- and third-party-sourced errors.
    pub(crate) fn stack_text(&self) -> String {
        format!(
            "AppError[{}]: {}\n{}",
            self.error_code.code, self.user_message, self.backtrace
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message)
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

fn interpolate(template: &str, args: &[String]) -> String {
    let parts: Vec<&str> = template.split("%s").collect();
    let mut out = String::with_capacity(template.len());
    for (i, part) in parts.iter().enumerate() {
        out.push_str(part);
        if i + 1 < parts.len() {
            match args.get(i) {
                Some(arg) => out.push_str(arg),
                None => out.push_str("%s"),
            }
        }
    }
    out
}
