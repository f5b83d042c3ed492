//! # authrelay
//!
//! Credential lifecycle management and resilient HTTP dispatch for embedded
//! API clients.
//!
//! Every API-client module that talks to a remote service needs the same
//! three things: authenticate against the service, cache and refresh the
//! resulting credential, and make outbound calls that tolerate transient
//! network failures. This crate packages exactly that: an [`AuthSession`]
//! that owns the credential lifecycle (disk-backed cache, expiry tracking,
//! strategy-driven reacquisition) and an [`HttpExecutor`] that sends the
//! authorized calls with bounded retries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use authrelay::{AuthSession, BearerToken, EnvironmentConfig, HttpCall, TokenRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), authrelay::Error> {
//!     let prod = EnvironmentConfig::new("https://api.example.com")
//!         .token_request(
//!             TokenRequest::new("https://auth.example.com/token")
//!                 .form("grant_type", "client_credentials")
//!                 .form("client_id", "orders-service"),
//!         );
//!
//!     let mut session = AuthSession::builder("orders")
//!         .strategy(BearerToken)
//!         .environment("prod")
//!         .env_config("prod", prod)
//!         .build()?;
//!
//!     let response = session.send(HttpCall::get("/v1/orders")).await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod config;
pub mod http;
pub mod prelude;

// Re-exports for convenience
pub use auth::{
    AcquireContext, AuthSession, AuthSessionBuilder, AuthStrategy, BasicAuth, BearerToken,
    ConsolePrompt, Credential, CredentialPrompt, CredentialStore, OAuth2, TokenResponse,
};
pub use config::{ConfigValue, EnvironmentConfig, TokenRequest};
pub use http::{Backoff, CallBody, HttpCall, HttpExecutor, HttpResponse, RetryPolicy};
// Re-exported for implementors of `CredentialPrompt`.
pub use secrecy::SecretString;

/// Error type for authrelay operations.
///
/// Attempt-level failures the executor retries (connect/read timeouts,
/// non-2xx statuses) never appear here individually; they surface only
/// aggregated as [`Error::RetriesExhausted`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failure that is never retried.
    #[error("request to {url} failed{}: {source}", fmt_status(*last_status))]
    Transport {
        url: String,
        last_status: Option<u16>,
        last_body: Option<String>,
        #[source]
        source: reqwest::Error,
    },

    /// Every attempt was consumed without a successful response.
    #[error("request to {url} failed after {attempts} attempts{}", fmt_status(*last_status))]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: Option<u16>,
        last_body: Option<String>,
    },

    /// Credential acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The named strategy exists for interface stability but has no
    /// working implementation.
    #[error("{0} authentication is not implemented")]
    Unimplemented(&'static str),

    /// Environment name missing from the environment-config table.
    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network connectivity or client construction failed.
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_status(status: Option<u16>) -> String {
    status
        .map(|s| format!(" (last status {s})"))
        .unwrap_or_default()
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Last HTTP status observed before the error, if any.
    pub fn last_status(&self) -> Option<u16> {
        match self {
            Error::Transport { last_status, .. } | Error::RetriesExhausted { last_status, .. } => {
                *last_status
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
