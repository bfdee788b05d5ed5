//! Pooled reqwest client shared by the snapshot catalog and report service

use reqwest::{Client, Response, StatusCode};
use repro_config::NetworkConfig;
use repro_errors::{Error, NetworkError};
use std::time::Duration;
use tracing::debug;

/// How often and how patiently a request is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub retries: u32,
    /// Base delay, multiplied by the attempt number
    pub backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::ZERO,
        }
    }

    fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Client settings derived from `[network]`
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: format!("repro/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            retry: RetryPolicy {
                retries: config.retries,
                backoff: Duration::from_secs(config.retry_delay),
            },
            ..Self::default()
        }
    }
}

/// Cheap to clone; clones share one connection pool
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    retry: RetryPolicy,
}

impl NetClient {
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// GET `url`, repeating on transport failures and 5xx answers.
    ///
    /// The last 5xx response is handed back once the retries are spent so the
    /// caller can report its status.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails at the transport level or the
    /// server answers `429 Too Many Requests`.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                tokio::time::sleep(self.retry.delay_before(attempt)).await;
            }
            let exhausted = attempt >= self.retry.retries;
            attempt += 1;

            match self.client.get(url).send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    return Err(NetworkError::RateLimited {
                        seconds: retry_after(&response).unwrap_or(self.retry.backoff.as_secs()),
                    }
                    .into());
                }
                Ok(response) if response.status().is_server_error() && !exhausted => {
                    debug!(url, status = %response.status(), attempt, "server error, retrying");
                }
                Ok(response) => return Ok(response),
                Err(e) if is_transient(&e) && !exhausted => {
                    debug!(url, error = %e, attempt, "transport error, retrying");
                }
                Err(e) => return Err(classify(url, &e)),
            }
        }
    }
}

fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

fn classify(url: &str, error: &reqwest::Error) -> Error {
    let network = if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(error.to_string())
    } else {
        NetworkError::RequestFailed(error.to_string())
    };
    network.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_with_attempts() {
        let policy = RetryPolicy {
            retries: 3,
            backoff: Duration::from_millis(200),
        };
        assert_eq!(policy.delay_before(1), Duration::from_millis(200));
        assert_eq!(policy.delay_before(3), Duration::from_millis(600));
        assert_eq!(RetryPolicy::none().delay_before(2), Duration::ZERO);
    }
}
