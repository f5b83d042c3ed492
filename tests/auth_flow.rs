//! End-to-end session behavior: bearer exchange, caching, expiry, basic auth.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use authrelay::{
    AuthSession, BasicAuth, BearerToken, ConfigValue, Credential, CredentialPrompt,
    CredentialStore, EnvironmentConfig, Error, HttpCall, OAuth2, Result, SecretString,
    TokenRequest,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bearer flows must never touch the interactive prompt.
struct FailPrompt;

impl CredentialPrompt for FailPrompt {
    fn obtain(&self, _name: &str, _environment: &str) -> Result<(String, SecretString)> {
        panic!("prompt must not be used by this flow");
    }
}

struct CountingPrompt {
    calls: Arc<AtomicUsize>,
}

impl CredentialPrompt for CountingPrompt {
    fn obtain(&self, _name: &str, _environment: &str) -> Result<(String, SecretString)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(("user".to_string(), SecretString::from("pass".to_string())))
    }
}

fn bearer_session(server: &MockServer, dir: &tempfile::TempDir) -> AuthSession {
    let token_request = TokenRequest::new(format!("{}/oauth/token", server.uri()))
        .form("grant_type", "client_credentials")
        .form("client_id", "orders-service");

    AuthSession::builder("orders")
        .strategy(BearerToken)
        .environment("prod")
        .env_config(
            "prod",
            EnvironmentConfig::new(server.uri()).token_request(token_request),
        )
        .cache_root(dir.path().join("cache"))
        .prompt(FailPrompt)
        .build()
        .unwrap()
}

#[tokio::test]
async fn bearer_token_is_acquired_once_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "expires_in": 120,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = bearer_session(&server, &dir);
    let credential = session.ensure_valid().await.unwrap();
    assert_eq!(credential.auth_header, "Bearer abc");
    assert_eq!(credential.access_token.as_deref(), Some("abc"));

    // Still valid in memory, and a brand-new session over the same cache
    // root loads it from disk. The single expect(1) covers both.
    session.ensure_valid().await.unwrap();
    let mut second = bearer_session(&server, &dir);
    let reloaded = second.ensure_valid().await.unwrap();
    assert_eq!(reloaded.auth_header, "Bearer abc");
}

#[tokio::test]
async fn stale_cached_token_is_reacquired() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    // Seed the cache with a token that expired long ago.
    CredentialStore::at(dir.path().join("cache"))
        .save("orders", "prod", &Credential::bearer("stale", 0, 0))
        .await
        .unwrap();

    let mut session = bearer_session(&server, &dir);
    let credential = session.ensure_valid().await.unwrap();
    assert_eq!(credential.auth_header, "Bearer fresh");
}

#[tokio::test]
async fn api_call_is_authorized_and_dispatched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/orders"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orders": []})))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = bearer_session(&server, &dir);
    let response = session.send(HttpCall::get("/v1/orders")).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["orders"], json!([]));
}

#[tokio::test]
async fn dynamic_token_params_are_resolved_per_request() {
    let server = MockServer::start().await;
    // expires_in of zero makes each token immediately stale, forcing the
    // next ensure_valid to go back to the endpoint.
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("signature=sig-0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "first",
            "expires_in": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("signature=sig-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "second",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&counter);
    let token_request = TokenRequest::new(format!("{}/oauth/token", server.uri())).form(
        "signature",
        ConfigValue::resolver(move || format!("sig-{}", seen.fetch_add(1, Ordering::SeqCst))),
    );

    let mut session = AuthSession::builder("orders")
        .strategy(BearerToken)
        .environment("prod")
        .env_config(
            "prod",
            EnvironmentConfig::new(server.uri()).token_request(token_request),
        )
        .cache_root(dir.path().join("cache"))
        .prompt(FailPrompt)
        .build()
        .unwrap();

    assert_eq!(session.ensure_valid().await.unwrap().auth_header, "Bearer first");
    assert_eq!(session.ensure_valid().await.unwrap().auth_header, "Bearer second");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn basic_auth_prompts_once_and_never_expires() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut session = AuthSession::builder("legacy")
        .strategy(BasicAuth)
        .environment("prod")
        .env_config("prod", EnvironmentConfig::new("https://prod.example.com"))
        .env_config("test", EnvironmentConfig::new("https://test.example.com"))
        .cache_root(dir.path().join("cache"))
        .prompt(CountingPrompt {
            calls: Arc::clone(&calls),
        })
        .build()
        .unwrap();

    let credential = session.ensure_valid().await.unwrap();
    assert_eq!(credential.auth_header, "Basic dXNlcjpwYXNz");
    assert_eq!(credential.expiry, None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Never expires, so no further prompting.
    session.ensure_valid().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Changing environment discards the credential and prompts again.
    assert!(session.set_environment("test"));
    session.ensure_valid().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn oauth2_fails_explicitly_instead_of_half_working() {
    let dir = tempfile::tempdir().unwrap();

    let mut session = AuthSession::builder("orders")
        .strategy(OAuth2)
        .environment("prod")
        .env_config("prod", EnvironmentConfig::new("https://prod.example.com"))
        .cache_root(dir.path().join("cache"))
        .prompt(FailPrompt)
        .build()
        .unwrap();

    let err = session.ensure_valid().await.unwrap_err();
    assert!(matches!(err, Error::Unimplemented("oauth2")), "got {err}");
}
