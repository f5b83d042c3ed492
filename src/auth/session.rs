//! Session orchestration: cache lookup, validity check, reacquisition.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::credential::unix_now;
use super::strategy::AcquireContext;
use super::{AuthStrategy, ConsolePrompt, Credential, CredentialPrompt, CredentialStore};
use crate::config::EnvironmentConfig;
use crate::http::{HttpCall, HttpExecutor, HttpResponse};
use crate::{Error, Result};

/// One named authentication context.
///
/// Holds the active environment, the chosen strategy, the environment
/// table, and the in-memory credential. A session is owned by one logical
/// caller: every operation takes `&mut self` and completes before the next
/// begins, so there is no locking and no concurrent dispatch.
///
/// Credential lifecycle: starts empty, populated from the disk cache or by
/// the strategy, persisted after every successful [`ensure_valid`] pass,
/// and discarded whenever the environment changes or the cache is cleared.
/// The on-disk copy outlives the process.
///
/// [`ensure_valid`]: AuthSession::ensure_valid
pub struct AuthSession {
    name: String,
    environment: String,
    environments: HashMap<String, EnvironmentConfig>,
    strategy: Box<dyn AuthStrategy>,
    credential: Option<Credential>,
    store: CredentialStore,
    prompt: Arc<dyn CredentialPrompt>,
    executor: HttpExecutor,
}

impl AuthSession {
    /// Start building a session for the named API client.
    pub fn builder(name: impl Into<String>) -> AuthSessionBuilder {
        AuthSessionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// In-memory credential, if any. Holding one does not imply validity.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn executor(&self) -> &HttpExecutor {
        &self.executor
    }

    fn env_config(&self) -> Result<&EnvironmentConfig> {
        self.environments
            .get(&self.environment)
            .ok_or_else(|| Error::UnknownEnvironment(self.environment.clone()))
    }

    /// Switch to another environment.
    ///
    /// An unknown name logs a warning and leaves the previous environment
    /// in place, returning `false`. The in-memory credential is discarded
    /// on every reassignment attempt either way; the on-disk cache of the
    /// old environment is left untouched.
    pub fn set_environment(&mut self, environment: &str) -> bool {
        self.credential = None;
        if !self.environments.contains_key(environment) {
            tracing::warn!(environment, "environment does not exist as a config");
            return false;
        }
        self.environment = environment.to_string();
        true
    }

    /// Return a currently valid credential.
    ///
    /// Performs at most one cache-load attempt and, if the credential is
    /// still absent or expired, exactly one fresh acquisition through the
    /// strategy. The result is persisted before returning, even when it
    /// is identical to what was just loaded.
    pub async fn ensure_valid(&mut self) -> Result<Credential> {
        self.ensure_valid_at(unix_now()).await
    }

    async fn ensure_valid_at(&mut self, now: i64) -> Result<Credential> {
        if self.credential.is_none() {
            tracing::debug!(
                session = %self.name,
                environment = %self.environment,
                "loading cached credentials"
            );
            self.credential = self.store.load(&self.name, &self.environment).await;
        }

        let credential = match self.credential.take() {
            Some(credential) if credential.is_valid(now) => credential,
            _ => {
                tracing::debug!(
                    session = %self.name,
                    environment = %self.environment,
                    strategy = self.strategy.name(),
                    "acquiring new authentication credentials"
                );
                let config = self
                    .environments
                    .get(&self.environment)
                    .ok_or_else(|| Error::UnknownEnvironment(self.environment.clone()))?;
                let ctx = AcquireContext {
                    name: &self.name,
                    environment: &self.environment,
                    config,
                    prompt: self.prompt.as_ref(),
                    executor: &self.executor,
                    now,
                };
                self.strategy.acquire(&ctx).await?
            }
        };

        self.store
            .save(&self.name, &self.environment, &credential)
            .await?;
        self.credential = Some(credential.clone());
        Ok(credential)
    }

    /// Authorize a pending call with a currently valid credential.
    ///
    /// Fills in the environment's API base URL only when the caller did
    /// not set one, and sets the `Authorization` header without touching
    /// any other header on the call.
    pub async fn authorize(&mut self, mut call: HttpCall) -> Result<HttpCall> {
        let credential = self.ensure_valid().await?;
        let api_url = self.env_config()?.api_url().to_string();
        call.set_base_url_if_absent(&api_url);
        call.set_header("Authorization", credential.auth_header);
        Ok(call)
    }

    /// Authorize the call and dispatch it through the session's executor.
    pub async fn send(&mut self, call: HttpCall) -> Result<HttpResponse> {
        let call = self.authorize(call).await?;
        self.executor.send(&call).await
    }

    /// Clear cached credentials on disk and in memory.
    pub async fn clear_credentials(&mut self) -> Result<()> {
        self.store.clear(&self.name, &self.environment).await?;
        self.credential = None;
        Ok(())
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("name", &self.name)
            .field("environment", &self.environment)
            .field("strategy", &self.strategy.name())
            .field("credential", &self.credential.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds an [`AuthSession`]. All configuration is carried here explicitly;
/// nothing is read from process-global state.
pub struct AuthSessionBuilder {
    name: String,
    environment: String,
    environments: HashMap<String, EnvironmentConfig>,
    strategy: Option<Box<dyn AuthStrategy>>,
    cache_root: Option<PathBuf>,
    prompt: Option<Arc<dyn CredentialPrompt>>,
    executor: Option<HttpExecutor>,
}

impl AuthSessionBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: "prod".to_string(),
            environments: HashMap::new(),
            strategy: None,
            cache_root: None,
            prompt: None,
            executor: None,
        }
    }

    /// Initial environment (default `"prod"`). Must have a matching
    /// [`env_config`](Self::env_config) entry by build time.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Register one environment's configuration.
    pub fn env_config(mut self, name: impl Into<String>, config: EnvironmentConfig) -> Self {
        self.environments.insert(name.into(), config);
        self
    }

    /// Register several environments at once.
    pub fn env_configs(
        mut self,
        configs: impl IntoIterator<Item = (String, EnvironmentConfig)>,
    ) -> Self {
        self.environments.extend(configs);
        self
    }

    /// Authentication strategy. Required.
    pub fn strategy(mut self, strategy: impl AuthStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Override the credential cache root (defaults to the user-scoped
    /// directory).
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    /// Override the interactive prompt (defaults to [`ConsolePrompt`]).
    pub fn prompt(mut self, prompt: impl CredentialPrompt + 'static) -> Self {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    /// Override the HTTP executor (defaults to one with the default retry
    /// policy).
    pub fn executor(mut self, executor: HttpExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn build(self) -> Result<AuthSession> {
        if !self.environments.contains_key(&self.environment) {
            return Err(Error::UnknownEnvironment(self.environment));
        }
        let strategy = self
            .strategy
            .ok_or_else(|| Error::config("an authentication strategy is required"))?;
        let store = match self.cache_root {
            Some(root) => CredentialStore::at(root),
            None => CredentialStore::user_scoped()?,
        };
        let executor = match self.executor {
            Some(executor) => executor,
            None => HttpExecutor::new()?,
        };
        let prompt = self.prompt.unwrap_or_else(|| Arc::new(ConsolePrompt));

        Ok(AuthSession {
            name: self.name,
            environment: self.environment,
            environments: self.environments,
            strategy,
            credential: None,
            store,
            prompt,
            executor,
        })
    }
}
