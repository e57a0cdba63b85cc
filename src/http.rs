//! Shared HTTP plumbing for the geocoder and weather gateway

use reqwest::{Client, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::{ForecastError, Result};

/// Responses slower than this get a warning
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Build a client with a bounded timeout and transient-failure retries
pub fn build_client(
    timeout: Duration,
    user_agent: &str,
    max_retries: u32,
) -> Result<ClientWithMiddleware> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ForecastError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Send a GET request. Transport failures become [`ForecastError::Network`];
/// the status is left for the caller to judge.
pub async fn get(client: &ClientWithMiddleware, url: &str) -> Result<Response> {
    let started = Instant::now();

    let response = client.get(url).send().await.map_err(|e| {
        let timed_out = is_timeout(&e);
        let message = transport_message(e);
        warn!(timed_out, "Request to {} failed: {}", redact(url), message);
        if timed_out {
            ForecastError::network(format!("request timed out: {message}"))
        } else {
            ForecastError::network(message)
        }
    })?;

    let elapsed = started.elapsed();
    debug!(
        status = response.status().as_u16(),
        "HTTP response received in {:.3}s",
        elapsed.as_secs_f64()
    );
    if elapsed > SLOW_RESPONSE {
        warn!("Slow upstream response: {:.3}s", elapsed.as_secs_f64());
    }

    Ok(response)
}

/// Error text without the request URL or the api key
fn transport_message(error: reqwest_middleware::Error) -> String {
    let message = match error {
        reqwest_middleware::Error::Reqwest(inner) => inner.without_url().to_string(),
        other => other.to_string(),
    };
    scrub_api_key(&message)
}

/// The retry middleware wraps the reqwest error, so the whole cause chain is searched
fn is_timeout(error: &reqwest_middleware::Error) -> bool {
    match error {
        reqwest_middleware::Error::Reqwest(inner) => {
            let root: &(dyn StdError + 'static) = inner;
            std::iter::successors(Some(root), |e: &&(dyn StdError + 'static)| (*e).source()).any(cause_timed_out)
        }
        reqwest_middleware::Error::Middleware(inner) => inner.chain().any(cause_timed_out),
    }
}

fn cause_timed_out(cause: &(dyn StdError + 'static)) -> bool {
    if let Some(inner) = cause.downcast_ref::<reqwest::Error>() {
        if inner.is_timeout() {
            return true;
        }
    }
    if let Some(reqwest_middleware::Error::Reqwest(inner)) =
        cause.downcast_ref::<reqwest_middleware::Error>()
    {
        if inner.is_timeout() {
            return true;
        }
    }
    if let Some(io) = cause.downcast_ref::<std::io::Error>() {
        if io.kind() == std::io::ErrorKind::TimedOut {
            return true;
        }
    }
    cause.to_string().contains("timed out")
}

/// Replace every `appid=<key>` value with `***`
fn scrub_api_key(text: &str) -> String {
    let mut scrubbed = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(index) = rest.find("appid=") {
        let (head, tail) = rest.split_at(index + "appid=".len());
        scrubbed.push_str(head);
        scrubbed.push_str("***");
        let end = tail
            .find(|c: char| c == '&' || c == ')' || c.is_whitespace())
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    scrubbed.push_str(rest);
    scrubbed
}

/// Decode a JSON body, mapping failures to a malformed-response error
pub async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| {
            ForecastError::network(format!("failed reading response body: {}", e.without_url()))
        })?;
    serde_json::from_slice(&bytes).map_err(|e| ForecastError::malformed(e.to_string()))
}

/// Strip the api key before a URL reaches the logs
#[must_use]
pub fn redact(url: &str) -> &str {
    url.split("appid=").next().unwrap_or(url)
}
