//! Behavior-driven tests for acquisition retries and backoff.
//!
//! These tests verify HOW the fetcher spreads retries over time and which
//! failures it refuses to retry, using a recording sleeper so the exact wait
//! schedule is assertable.

use std::time::Duration;

use agrimap_core::{fetch, FetchError, FetchPolicy, HttpRequest, ProductionQuery};
use agrimap_tests::*;

fn policy(base: Duration) -> FetchPolicy {
    FetchPolicy {
        max_retries: 3,
        base_delay: base,
    }
}

// =============================================================================
// Retry: Backoff Schedules
// =============================================================================

#[tokio::test]
async fn when_rate_limited_system_doubles_the_wait_each_attempt() {
    // Given: a provider that answers 429 twice, then succeeds
    let client = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::with_status(429, "")),
        Ok(HttpResponse::with_status(429, "")),
        Ok(HttpResponse::ok_json("{\"data\": []}")),
    ]);
    let sleeper = RecordingSleeper::new();

    // When: one logical fetch runs with a one-second base delay
    let request = HttpRequest::get("https://stats.example.test/data");
    let response = fetch(&client, &sleeper, &request, &policy(Duration::from_secs(1)))
        .await
        .expect("third attempt succeeds");

    // Then: the waits follow the exponential schedule 1s, 2s
    assert_eq!(response.status, 200);
    assert_eq!(
        sleeper.waits(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn when_the_network_flaps_system_backs_off_linearly() {
    // Given: two transport failures before a success
    let client = ScriptedHttpClient::new(vec![
        Err(HttpError::new("connection reset")),
        Err(HttpError::new("connection reset")),
        Ok(HttpResponse::ok_json("{}")),
    ]);
    let sleeper = RecordingSleeper::new();

    // When: one logical fetch runs
    let request = HttpRequest::get("https://stats.example.test/data");
    fetch(&client, &sleeper, &request, &policy(Duration::from_millis(200)))
        .await
        .expect("third attempt succeeds");

    // Then: waits grow linearly with the attempt number
    assert_eq!(
        sleeper.waits(),
        vec![Duration::from_millis(200), Duration::from_millis(400)]
    );
}

// =============================================================================
// Retry: Refusals and Exhaustion
// =============================================================================

#[tokio::test]
async fn when_the_provider_rejects_the_request_system_does_not_retry() {
    // Given: a provider that answers 403
    let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(403, "forbidden"))]);
    let sleeper = RecordingSleeper::new();

    // When: one logical fetch runs
    let request = HttpRequest::get("https://stats.example.test/data");
    let error = fetch(&client, &sleeper, &request, &policy(Duration::from_secs(1)))
        .await
        .expect_err("4xx is terminal");

    // Then: the failure surfaces immediately with no backoff
    assert!(matches!(error, FetchError::Terminal { .. }));
    assert!(!error.retryable());
    assert!(sleeper.waits().is_empty());
    assert_eq!(client.seen_requests().len(), 1);
}

#[tokio::test]
async fn when_rate_limiting_never_lifts_system_reports_the_attempt_count() {
    // Given: a provider that always answers 429
    let client = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::with_status(429, "")),
        Ok(HttpResponse::with_status(429, "")),
        Ok(HttpResponse::with_status(429, "")),
    ]);
    let sleeper = RecordingSleeper::new();

    // When: the retry budget is exhausted
    let request = HttpRequest::get("https://stats.example.test/data");
    let error = fetch(&client, &sleeper, &request, &policy(Duration::from_millis(1)))
        .await
        .expect_err("budget exhausted");

    // Then: the error carries the full attempt count
    assert!(matches!(error, FetchError::RateLimited { attempts: 3 }));
    assert_eq!(sleeper.waits().len(), 2, "no wait after the final attempt");
}

// =============================================================================
// Retry: Recovery Inside the Source Chain
// =============================================================================

#[tokio::test]
async fn when_retries_eventually_succeed_the_resolver_still_reports_live_origin() {
    // Given: a flaky provider that succeeds on the third attempt
    let client = ScriptedHttpClient::new(vec![
        Err(HttpError::new("timeout")),
        Ok(HttpResponse::with_status(503, "")),
        Ok(HttpResponse::ok_json(production_body("32", 500.0))),
    ]);
    let (resolver, _) = test_resolver(test_config(), client);

    // When: production resolution runs
    let resolved = resolver
        .production(&ProductionQuery::new(2023))
        .await
        .expect("recovers within the retry budget");

    // Then: the result counts as a live acquisition, not a fallback
    assert_eq!(resolved.origin, DataOrigin::Live);
    assert_eq!(resolved.records[0].value(Month::Jan), 500.0);
}
