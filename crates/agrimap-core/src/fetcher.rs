//! Single logical fetch with bounded retries and rate-limit-aware backoff.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use tracing::warn;

use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};

/// Retry budget and backoff base for one logical fetch.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    /// Backoff unit; rate-limit waits double per attempt, transport waits
    /// grow linearly.
    pub base_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl FetchPolicy {
    /// Wait after a rate-limited attempt: `2^attempt * base` (attempt 0-based).
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Wait after a transport/5xx failure: `(attempt + 1) * base`.
    pub fn transient_delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt + 1)
    }
}

/// Sleep seam so backoff schedules are assertable in tests.
pub trait Sleeper: Send + Sync {
    fn sleep<'a>(
        &'a self,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep<'a>(
        &'a self,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Test double that records requested waits and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.slept.lock().expect("lock poisoned").clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep<'a>(
        &'a self,
        duration: Duration,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.slept.lock().expect("lock poisoned").push(duration);
        Box::pin(async {})
    }
}

/// Execute `request`, retrying per the policy.
///
/// - 429 waits exponentially and retries.
/// - Transport errors and 5xx wait linearly and retry.
/// - Any other 4xx is terminal and surfaces immediately, unretried.
///
/// After the budget is exhausted the last error propagates.
pub async fn fetch(
    client: &dyn HttpClient,
    sleeper: &dyn Sleeper,
    request: &HttpRequest,
    policy: &FetchPolicy,
) -> Result<HttpResponse, FetchError> {
    let attempts = policy.max_retries.max(1);
    let mut last_error = FetchError::transient("no attempt was made");

    for attempt in 0..attempts {
        let is_last = attempt + 1 == attempts;

        match client.execute(request.clone()).await {
            Ok(response) if response.status == 429 => {
                if is_last {
                    return Err(FetchError::RateLimited {
                        attempts: attempt + 1,
                    });
                }
                let wait = policy.rate_limit_delay(attempt);
                warn!(url = %request.url, attempt, wait_ms = wait.as_millis() as u64, "rate limited, backing off");
                sleeper.sleep(wait).await;
                continue;
            }
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) if response.status >= 400 && response.status < 500 => {
                return Err(FetchError::terminal(format!(
                    "provider returned status {}",
                    response.status
                )));
            }
            Ok(response) => {
                last_error = FetchError::transient(format!(
                    "provider returned status {}",
                    response.status
                ));
            }
            Err(error) => {
                last_error = FetchError::transient(error.message());
            }
        }

        if is_last {
            return Err(last_error);
        }
        let wait = policy.transient_delay(attempt);
        warn!(url = %request.url, attempt, wait_ms = wait.as_millis() as u64, "transient fetch failure, retrying");
        sleeper.sleep(wait).await;
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, ScriptedHttpClient};

    fn policy_ms(base_ms: u64) -> FetchPolicy {
        FetchPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(base_ms),
        }
    }

    #[tokio::test]
    async fn rate_limit_backs_off_exponentially_then_succeeds() {
        let client = ScriptedHttpClient::new(vec![
            Ok(HttpResponse::with_status(429, "")),
            Ok(HttpResponse::with_status(429, "")),
            Ok(HttpResponse::ok_json("{\"data\":[]}")),
        ]);
        let sleeper = RecordingSleeper::new();
        let request = HttpRequest::get("http://example.test/data");

        let response = fetch(&client, &sleeper, &request, &policy_ms(1_000))
            .await
            .expect("third attempt succeeds");

        assert_eq!(response.body, "{\"data\":[]}");
        assert_eq!(
            sleeper.waits(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn transport_failures_back_off_linearly() {
        let client = ScriptedHttpClient::new(vec![
            Err(HttpError::new("connection refused")),
            Err(HttpError::new("connection refused")),
            Ok(HttpResponse::ok_json("{}")),
        ]);
        let sleeper = RecordingSleeper::new();
        let request = HttpRequest::get("http://example.test/data");

        fetch(&client, &sleeper, &request, &policy_ms(100))
            .await
            .expect("third attempt succeeds");

        assert_eq!(
            sleeper.waits(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn terminal_client_error_is_not_retried() {
        let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(
            400,
            "bad request",
        ))]);
        let sleeper = RecordingSleeper::new();
        let request = HttpRequest::get("http://example.test/data");

        let error = fetch(&client, &sleeper, &request, &policy_ms(100))
            .await
            .expect_err("400 is terminal");

        assert!(matches!(error, FetchError::Terminal { .. }));
        assert!(sleeper.waits().is_empty(), "no backoff for terminal errors");
        assert_eq!(client.seen_requests().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_budget_propagates_last_error() {
        let client = ScriptedHttpClient::new(vec![
            Err(HttpError::new("reset")),
            Ok(HttpResponse::with_status(503, "")),
            Err(HttpError::new("reset again")),
        ]);
        let sleeper = RecordingSleeper::new();
        let request = HttpRequest::get("http://example.test/data");

        let error = fetch(&client, &sleeper, &request, &policy_ms(10))
            .await
            .expect_err("budget exhausted");

        assert!(matches!(error, FetchError::Transient { .. }));
        assert!(error.to_string().contains("reset again"));
        assert_eq!(sleeper.waits().len(), 2);
    }

    #[tokio::test]
    async fn persistent_rate_limit_surfaces_rate_limited_error() {
        let client = ScriptedHttpClient::new(vec![
            Ok(HttpResponse::with_status(429, "")),
            Ok(HttpResponse::with_status(429, "")),
            Ok(HttpResponse::with_status(429, "")),
        ]);
        let sleeper = RecordingSleeper::new();
        let request = HttpRequest::get("http://example.test/data");

        let error = fetch(&client, &sleeper, &request, &policy_ms(10))
            .await
            .expect_err("always 429");

        assert!(matches!(error, FetchError::RateLimited { attempts: 3 }));
        assert_eq!(sleeper.waits().len(), 2);
    }
}
