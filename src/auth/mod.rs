//! Credential lifecycle management.
//!
//! An [`AuthSession`] orchestrates one named authentication context:
//! cache lookup through [`CredentialStore`], validity checking on the
//! [`Credential`] record, and strategy-driven reacquisition via one of:
//! - **Basic**: username/secret collected through the injected prompt
//! - **Bearer**: token-endpoint exchange
//! - **OAuth2**: preserved interface shape, explicitly unimplemented

mod credential;
mod prompt;
mod session;
mod store;
mod strategy;

pub use credential::Credential;
pub use prompt::{ConsolePrompt, CredentialPrompt};
pub use session::{AuthSession, AuthSessionBuilder};
pub use store::CredentialStore;
pub use strategy::{AcquireContext, AuthStrategy, BasicAuth, BearerToken, OAuth2, TokenResponse};
