//! Bearer-token authentication against a token endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use super::{AcquireContext, AuthStrategy};
use crate::auth::Credential;
use crate::{Error, Result};

const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Token endpoint response body.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds; endpoints that omit it get an hour.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    /// Fields this crate does not interpret (token_type, scope, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN
}

impl TokenResponse {
    /// Convert into a credential anchored at `now`.
    pub fn into_credential(self, now: i64) -> Credential {
        let mut credential = Credential::bearer(self.access_token, self.expires_in, now);
        credential.extra = self.extra;
        credential
    }
}

/// Exchanges the environment's token request for a bearer token.
///
/// Dynamic values in the token request are re-resolved on every
/// acquisition, immediately before the POST goes out.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerToken;

#[async_trait]
impl AuthStrategy for BearerToken {
    fn name(&self) -> &'static str {
        "bearer"
    }

    async fn acquire(&self, ctx: &AcquireContext<'_>) -> Result<Credential> {
        let spec = ctx.config.token_request_spec().ok_or_else(|| {
            Error::config(format!(
                "environment '{}' has no token request configured",
                ctx.environment
            ))
        })?;

        let response = ctx.executor.send(&spec.to_call()).await?;
        let token: TokenResponse = response
            .json()
            .map_err(|error| Error::auth(format!("token endpoint returned an unusable body: {error}")))?;

        Ok(token.into_credential(ctx.now))
    }
}
