//! Deployment environment classification.
//!
//! Gates developer diagnostic disclosure: `devMessage` fields are
//! rendered only outside production.

/// Deployment environment, read from the `APP_ENV` process variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Read from `APP_ENV`. Missing or unknown values classify as
    /// development, so diagnostics stay visible on local setups.
    pub fn from_env() -> Self {
        std::env::var("APP_ENV")
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}
