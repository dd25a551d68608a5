//! Shared HTTP transport.
//!
//! Every remote call goes through [`send`], which retries rate limits,
//! transient server errors and connection/timeout failures with a growing
//! delay. The per-request deadline is set once on the [`Client`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tokio::time::sleep;

use crate::warning;

pub const MAX_ATTEMPTS: u32 = 5;
const BASE_BACKOFF: Duration = Duration::from_secs(1);
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// A remote lookup that produced no usable data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{service} returned {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },
}

pub fn client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(timeout)
        .build()
}

pub fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Delay before the attempt following `attempt` (1-based): 1s, 2s, 4s, 8s.
pub fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.saturating_pow(attempt.saturating_sub(1))
}

fn retry_after(response: &Response) -> Option<Duration> {
    let secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()?;

    if secs <= MAX_RETRY_AFTER_SECS {
        Some(Duration::from_secs(secs))
    } else {
        warning!(
            "Retry-After of {} seconds is abnormally high, using backoff instead.",
            secs
        );
        None
    }
}

/// Sends a request, retrying up to [`MAX_ATTEMPTS`] times.
///
/// The final response is returned whatever its status, so callers decide
/// what a 404 or 401 means for them. Requests whose body cannot be cloned are
/// sent exactly once.
///
/// Only use this for requests that are safe to repeat. A timed-out request
/// may already have been processed by the server and is sent again.
///
/// # Errors
///
/// Returns the last [`reqwest::Error`] when every attempt failed at the
/// network level, or immediately for non-transient errors.
pub async fn send(request: RequestBuilder) -> Result<Response, reqwest::Error> {
    send_with(request, true).await
}

/// Like [`send`], but never repeats a request that timed out.
///
/// For requests that create something on the server, such as a post. A
/// timeout leaves the outcome unknown, so the error is returned to the
/// caller. Connection failures and retryable statuses are still retried:
/// in both cases the server did not act on the request.
pub async fn send_non_idempotent(request: RequestBuilder) -> Result<Response, reqwest::Error> {
    send_with(request, false).await
}

async fn send_with(
    request: RequestBuilder,
    retry_timeouts: bool,
) -> Result<Response, reqwest::Error> {
    let mut attempt = 1;

    loop {
        let Some(current) = request.try_clone() else {
            return request.send().await;
        };

        let last = attempt >= MAX_ATTEMPTS;
        match current.send().await {
            Ok(response) if is_retryable(response.status()) && !last => {
                let delay = retry_after(&response).unwrap_or_else(|| backoff(attempt));
                warning!(
                    "{} returned {}, retrying in {}s ({}/{})",
                    response.url(),
                    response.status(),
                    delay.as_secs(),
                    attempt,
                    MAX_ATTEMPTS
                );
                sleep(delay).await;
            }
            Ok(response) => return Ok(response),
            Err(err) if is_replayable(&err, retry_timeouts) && !last => {
                let delay = backoff(attempt);
                warning!(
                    "Request failed: {}, retrying in {}s ({}/{})",
                    err,
                    delay.as_secs(),
                    attempt,
                    MAX_ATTEMPTS
                );
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }

        attempt += 1;
    }
}

fn is_replayable(err: &reqwest::Error, retry_timeouts: bool) -> bool {
    err.is_connect() || (retry_timeouts && err.is_timeout())
}
