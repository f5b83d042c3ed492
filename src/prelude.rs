//! Prelude module for convenient imports.
//!
//! ```rust
//! use authrelay::prelude::*;
//! ```

pub use crate::Error;
pub use crate::Result;

// Authentication
pub use crate::auth::{
    AuthSession, AuthSessionBuilder, AuthStrategy, BasicAuth, BearerToken, Credential,
    CredentialPrompt, CredentialStore, OAuth2,
};

// Configuration
pub use crate::config::{ConfigValue, EnvironmentConfig, TokenRequest};

// HTTP dispatch
pub use crate::http::{HttpCall, HttpExecutor, HttpResponse, RetryPolicy};
