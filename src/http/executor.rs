//! Retry loop with failure classification.

use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::{CallBody, HttpCall};
use crate::{Error, Result};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Full-jitter exponential delay between attempts.
///
/// Off by default: the executor inserts no delay unless a policy opts in.
#[derive(Clone, Debug)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Delay before the attempt following failure number `failures`.
    ///
    /// Uniformly sampled from zero up to `min(cap, base * 2^(failures-1))`.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let doublings = failures.saturating_sub(1).min(20);
        let exp = self.base.as_millis().saturating_mul(1 << doublings);
        let upper = exp.min(self.cap.as_millis()) as u64;
        Duration::from_millis((rand::random::<f64>() * upper as f64) as u64)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(10),
        }
    }
}

/// Bounds for one logical call: attempt count, per-attempt timeout, and the
/// optional delay between attempts.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff: Option<Backoff>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            timeout,
            backoff: None,
        }
    }

    /// Insert a jittered delay between attempts.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = Some(backoff);
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT)
    }
}

/// A fully received HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    status: StatusCode,
    url: String,
    body: Bytes,
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Response body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Sends one logical [`HttpCall`] with bounded retries.
///
/// Attempt-level classification:
/// - connect timeout: logged at info, retried;
/// - response-body timeout: logged at info, retried;
/// - non-2xx status: logged at debug, retried (4xx is deliberately not
///   split from 5xx, see DESIGN.md);
/// - any other transport failure: fatal immediately, carrying the last
///   observed status and body;
/// - attempts exhausted: [`Error::RetriesExhausted`].
#[derive(Clone, Debug)]
pub struct HttpExecutor {
    client: reqwest::Client,
    policy: RetryPolicy,
    dump_requests: bool,
}

impl HttpExecutor {
    /// Executor with the default policy.
    pub fn new() -> Result<Self> {
        Self::with_policy(RetryPolicy::default())
    }

    /// Executor with an explicit policy.
    pub fn with_policy(policy: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            policy,
            dump_requests: false,
        })
    }

    /// Emit a raw dump of each prepared request through the debug log.
    pub fn dump_requests(mut self, enabled: bool) -> Self {
        self.dump_requests = enabled;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send the call, retrying transient failures up to the policy's
    /// attempt budget.
    pub async fn send(&self, call: &HttpCall) -> Result<HttpResponse> {
        let url = call
            .url()
            .ok_or_else(|| Error::config("call has no base URL and a relative path"))?;

        if self.dump_requests {
            tracing::debug!(request = %call.dump(), "prepared request");
        }

        let attempts = self.policy.max_attempts;
        let mut last_status: Option<u16> = None;
        let mut last_body: Option<String> = None;

        for attempt in 1..=attempts {
            if attempt > 1
                && let Some(backoff) = &self.policy.backoff
            {
                tokio::time::sleep(backoff.delay_for(attempt - 1)).await;
            }

            match self.build_request(call, &url).send().await {
                Ok(response) if response.status().is_success() => {
                    let status = response.status();
                    match response.bytes().await {
                        Ok(body) => {
                            return Ok(HttpResponse {
                                status,
                                url,
                                body,
                            });
                        }
                        Err(source) if source.is_timeout() => {
                            tracing::info!(
                                attempt,
                                url = %url,
                                "server did not send the response body in the allotted time"
                            );
                        }
                        Err(source) => {
                            return Err(Error::Transport {
                                url,
                                last_status: Some(status.as_u16()),
                                last_body,
                                source,
                            });
                        }
                    }
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    tracing::debug!(attempt, status, url = %url, "attempt returned error status");
                    last_status = Some(status);
                    last_body = response.text().await.ok();
                }
                Err(source) if source.is_timeout() => {
                    if source.is_connect() {
                        tracing::info!(attempt, url = %url, "timed out connecting to server");
                    } else {
                        tracing::info!(
                            attempt,
                            url = %url,
                            "server did not send data in the allotted time"
                        );
                    }
                }
                Err(source) => {
                    return Err(Error::Transport {
                        url,
                        last_status,
                        last_body,
                        source,
                    });
                }
            }
        }

        Err(Error::RetriesExhausted {
            url,
            attempts,
            last_status,
            last_body,
        })
    }

    fn build_request(&self, call: &HttpCall, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(call.method().clone(), url)
            .timeout(self.policy.timeout);

        if !call.query_pairs().is_empty() {
            request = request.query(call.query_pairs());
        }
        for (name, value) in call.header_pairs() {
            request = request.header(name, value);
        }
        match call.body() {
            Some(CallBody::Json(value)) => request = request.json(value),
            Some(CallBody::Form(fields)) => request = request.form(fields),
            None => {}
        }
        request
    }
}
