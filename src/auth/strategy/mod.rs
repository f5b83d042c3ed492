//! Authentication strategies.
//!
//! A strategy knows how to produce a fresh [`Credential`] for one
//! environment. The set is deliberately small and stable:
//! - [`BasicAuth`]: username/secret from the injected prompt;
//! - [`BearerToken`]: token-endpoint exchange;
//! - [`OAuth2`]: preserved interface, explicitly unimplemented.

mod basic;
mod bearer;
mod oauth2;

pub use basic::BasicAuth;
pub use bearer::{BearerToken, TokenResponse};
pub use oauth2::OAuth2;

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Credential, CredentialPrompt};
use crate::Result;
use crate::config::EnvironmentConfig;
use crate::http::HttpExecutor;

/// Collaborators a strategy may need while acquiring a credential.
pub struct AcquireContext<'a> {
    /// Session name, used in prompts and log lines.
    pub name: &'a str,
    /// Active environment name.
    pub environment: &'a str,
    /// Active environment's configuration.
    pub config: &'a EnvironmentConfig,
    /// Interactive prompt for strategies that need a username/secret.
    pub prompt: &'a dyn CredentialPrompt,
    /// Executor for strategies that call a token endpoint.
    pub executor: &'a HttpExecutor,
    /// Unix seconds at the start of the acquisition.
    pub now: i64,
}

/// Produces a fresh credential for one environment.
#[async_trait]
pub trait AuthStrategy: Send + Sync + Debug {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Acquire a fresh credential.
    async fn acquire(&self, ctx: &AcquireContext<'_>) -> Result<Credential>;
}
