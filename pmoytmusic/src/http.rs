//! Resilient HTTP fetching
//!
//! Every upstream call goes through [`HttpFetcher::fetch_resilient`]:
//!
//! - each attempt (headers and body) is bounded by a timeout, the in-flight
//!   request is dropped (and therefore cancelled) when it expires;
//! - 429/503 answers and transport failures are retried with an exponential
//!   backoff `base * 2^i + jitter`;
//! - any other non-success status is returned immediately;
//! - when the budget is spent the last error is wrapped in
//!   [`Error::RetriesExhausted`].
//!
//! Attempts of one request are strictly sequential.

use crate::config::YtMusicConfig;
use crate::error::{Error, Result};
use rand::Rng;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Browser user agents rotated across requests
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36",
];

/// Maximum length of an error body kept in [`Error::Status`]
const MAX_ERROR_BODY: usize = 200;

/// Pick a user agent at random
pub fn random_user_agent() -> &'static str {
    let idx = rand::rng().random_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Timeout and retry budget of the resilience layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed beyond the first attempt
    pub max_retries: u32,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Base of the exponential backoff
    pub backoff_base: Duration,
    /// Upper bound of the random jitter
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &YtMusicConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: config.fetch_timeout(),
            backoff_base: config.backoff_base(),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }

    /// Total number of attempts (first try included)
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `attempt` (0-based), jitter is clamped to `max_jitter`
    pub fn backoff_delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base
            .saturating_mul(factor)
            .saturating_add(jitter.min(self.max_jitter))
    }

    fn random_jitter(&self) -> Duration {
        let max = self.max_jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&YtMusicConfig::default())
    }
}

/// A request that can be replayed across attempts
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    json: Option<Value>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            json: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            json: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// HTTP fetcher with timeout, bounded retries and backoff
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `request` and read its body, retrying retryable failures within
    /// the policy budget
    pub async fn fetch_resilient(&self, request: &FetchRequest) -> Result<String> {
        let attempts = self.policy.attempts();
        let mut attempt = 0;

        loop {
            let err = match self.attempt(request).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };

            if !err.is_retryable() {
                error!("fetch {} failed: {}", request.url, err);
                return Err(err);
            }

            if attempt + 1 >= attempts {
                error!("fetch {} failed after {} attempts: {}", request.url, attempts, err);
                return Err(Error::RetriesExhausted {
                    attempts,
                    source: Box::new(err),
                });
            }

            let delay = self.policy.backoff_delay(attempt, self.policy.random_jitter());
            warn!(
                url = %request.url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying after: {}",
                err
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Send `request` resiliently and decode the body as JSON
    pub async fn fetch_json(&self, request: &FetchRequest) -> Result<Value> {
        let text = self.fetch_resilient(request).await?;
        debug!("{} answered {} bytes", request.url, text.len());
        Ok(serde_json::from_str(&text)?)
    }

    /// One attempt: headers and body must both arrive within the timeout
    async fn attempt(&self, request: &FetchRequest) -> Result<String> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        // Dropping the exchange on timeout aborts the underlying connection
        match tokio::time::timeout(self.policy.timeout, exchange(builder)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }
}

async fn exchange(builder: RequestBuilder) -> Result<String> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response.text().await?);
    }

    let code = status.as_u16();
    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| message.is_char_boundary(*i))
            .unwrap_or(0);
        message.truncate(cut);
    }
    Err(Error::from_status(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            timeout: Duration::from_secs(1),
            backoff_base: Duration::from_millis(250),
            max_jitter: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_backoff_is_exponential() {
        let p = policy();
        assert_eq!(p.backoff_delay(0, Duration::ZERO), Duration::from_millis(250));
        assert_eq!(p.backoff_delay(1, Duration::ZERO), Duration::from_millis(500));
        assert_eq!(p.backoff_delay(2, Duration::ZERO), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_jitter_is_bounded() {
        let p = policy();
        assert_eq!(
            p.backoff_delay(0, Duration::from_millis(40)),
            Duration::from_millis(290)
        );
        assert_eq!(
            p.backoff_delay(0, Duration::from_secs(10)),
            Duration::from_millis(350)
        );
        for _ in 0..50 {
            assert!(p.random_jitter() <= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_attempts() {
        assert_eq!(policy().attempts(), 3);
        let none = RetryPolicy {
            max_retries: 0,
            ..policy()
        };
        assert_eq!(none.attempts(), 1);
    }

    #[test]
    fn test_random_user_agent() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
    }
}
