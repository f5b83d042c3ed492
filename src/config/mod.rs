//! Environment configuration for authentication sessions.
//!
//! An [`EnvironmentConfig`] describes one deployment target: the base URL
//! its API lives under and, for token-based strategies, how to call its
//! token endpoint. Token-request values are [`ConfigValue`]s so a caller can
//! supply either a literal or a resolver closure that is re-evaluated
//! immediately before every token request (a freshly generated signature,
//! for example).

use std::fmt;
use std::sync::Arc;

use crate::http::HttpCall;

/// A configuration value that is either a literal or resolved at call time.
#[derive(Clone)]
pub enum ConfigValue {
    /// Fixed string value.
    Literal(String),
    /// Zero-argument resolver invoked immediately before each use.
    Resolved(Arc<dyn Fn() -> String + Send + Sync>),
}

impl ConfigValue {
    /// Create a literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a lazily resolved value.
    pub fn resolver(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Resolved(Arc::new(f))
    }

    /// Resolve to a concrete string.
    pub fn resolve(&self) -> String {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Resolved(f) => f(),
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Resolved(_) => f.write_str("Resolved(..)"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

/// Call specification for a token endpoint.
#[derive(Clone, Debug)]
pub struct TokenRequest {
    url: String,
    headers: Vec<(String, ConfigValue)>,
    form: Vec<(String, ConfigValue)>,
    query: Vec<(String, ConfigValue)>,
}

impl TokenRequest {
    /// Create a request spec for the given token endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            form: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Add a header sent with every token request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a form-body parameter.
    pub fn form(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    /// Add a URL query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Token endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Materialize a POST call, resolving every dynamic value now.
    pub(crate) fn to_call(&self) -> HttpCall {
        let mut call = HttpCall::post(&self.url);
        for (name, value) in &self.headers {
            if matches!(value, ConfigValue::Resolved(_)) {
                tracing::debug!(header = %name, "resolving dynamic token request value");
            }
            call = call.header(name, value.resolve());
        }
        for (name, value) in &self.query {
            if matches!(value, ConfigValue::Resolved(_)) {
                tracing::debug!(param = %name, "resolving dynamic token request value");
            }
            call = call.query(name, value.resolve());
        }
        let form: Vec<(String, String)> = self
            .form
            .iter()
            .map(|(name, value)| {
                if matches!(value, ConfigValue::Resolved(_)) {
                    tracing::debug!(field = %name, "resolving dynamic token request value");
                }
                (name.clone(), value.resolve())
            })
            .collect();
        if !form.is_empty() {
            call = call.form(form);
        }
        call
    }
}

/// Per-environment settings for one authentication session.
#[derive(Clone, Debug)]
pub struct EnvironmentConfig {
    api_url: String,
    token_request: Option<TokenRequest>,
}

impl EnvironmentConfig {
    /// Create a config with the environment's API base URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token_request: None,
        }
    }

    /// Attach the token endpoint call spec used by token-based strategies.
    pub fn token_request(mut self, request: TokenRequest) -> Self {
        self.token_request = Some(request);
        self
    }

    /// Base URL calls against this environment default to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Token endpoint call spec, if configured.
    pub fn token_request_spec(&self) -> Option<&TokenRequest> {
        self.token_request.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_literal_resolve() {
        let value = ConfigValue::literal("client_credentials");
        assert_eq!(value.resolve(), "client_credentials");
        assert_eq!(value.resolve(), "client_credentials");
    }

    #[test]
    fn test_resolver_called_every_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let value = ConfigValue::resolver(move || {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            format!("signature-{n}")
        });

        assert_eq!(value.resolve(), "signature-1");
        assert_eq!(value.resolve(), "signature-2");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_token_request_resolves_fresh_per_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let request = TokenRequest::new("https://auth.example.com/token")
            .form("grant_type", "client_credentials")
            .form(
                "signature",
                ConfigValue::resolver(move || {
                    format!("sig-{}", seen.fetch_add(1, Ordering::SeqCst))
                }),
            );

        let first = request.to_call();
        let second = request.to_call();

        assert_ne!(first.dump(), second.dump());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_environment_config() {
        let config = EnvironmentConfig::new("https://api.example.com")
            .token_request(TokenRequest::new("https://auth.example.com/token"));

        assert_eq!(config.api_url(), "https://api.example.com");
        assert!(config.token_request_spec().is_some());
    }

    #[test]
    fn test_config_value_debug_redacts_resolver() {
        let value = ConfigValue::resolver(|| "secret".into());
        assert_eq!(format!("{value:?}"), "Resolved(..)");
    }
}
