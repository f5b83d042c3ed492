//! Basic authentication via the interactive prompt.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use secrecy::ExposeSecret;

use super::{AcquireContext, AuthStrategy};
use crate::Result;
use crate::auth::Credential;

/// Obtains a username and secret out-of-band and encodes them as a
/// `Basic` header. The credential carries no expiry; it stays valid until
/// the environment changes or the cache is cleared explicitly.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicAuth;

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn acquire(&self, ctx: &AcquireContext<'_>) -> Result<Credential> {
        let (username, secret) = ctx.prompt.obtain(ctx.name, ctx.environment)?;
        let cred_string = STANDARD.encode(format!("{username}:{}", secret.expose_secret()));
        Ok(Credential::basic(username, cred_string, ctx.now))
    }
}
