use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection failures and timeouts may clear up on their own; anything else
/// (bad URL, redirect loop, body decoding) fails the same way every time.
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Sends a request up to `retries + 1` times, sleeping `delay_ms` between
/// attempts. Only transient transport errors are retried.
pub async fn with_retry<F, Fut, T>(mut send: F, retries: usize, delay_ms: u64) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let attempts = retries + 1;
    let mut attempt = 1;
    loop {
        let err = match send().await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };
        if !is_transient(&err) {
            debug!("Request failed permanently: {err}");
            return Err(err.into());
        }
        if attempt == attempts {
            warn!("Request failed after {attempts} attempts: {err}");
            return Err(err.into());
        }
        debug!("Attempt {attempt}/{attempts} failed: {err}. Retrying in {delay_ms}ms");
        attempt += 1;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
