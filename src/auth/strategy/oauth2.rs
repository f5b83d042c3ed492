//! OAuth2 strategy placeholder.

use async_trait::async_trait;

use super::{AcquireContext, AuthStrategy};
use crate::auth::Credential;
use crate::{Error, Result};

/// OAuth2 client-credential exchange, kept so the strategy set is stable.
///
/// The intended flow composes a Basic credential and then runs a
/// bearer-style exchange with it, but has never been verified to work end
/// to end. Until it is, invoking it fails loudly instead of handing back a
/// token the remote service may not honor.
#[derive(Clone, Copy, Debug, Default)]
pub struct OAuth2;

#[async_trait]
impl AuthStrategy for OAuth2 {
    fn name(&self) -> &'static str {
        "oauth2"
    }

    async fn acquire(&self, _ctx: &AcquireContext<'_>) -> Result<Credential> {
        Err(Error::Unimplemented("oauth2"))
    }
}
