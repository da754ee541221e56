use std::future::Future;
use tracing::warn;
use crate::error::{Error, Result};
use crate::utils::time::sleep_with_jitter;

/// Runs `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or `retries` extra attempts are spent. The delay doubles after
/// every failure and the last error is returned.
pub async fn retry_with_backoff<T, F, Fut, P>(
    mut retries: u32,
    base_delay_ms: u64,
    should_retry: P,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    let mut delay = base_delay_ms;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if retries == 0 || !should_retry(&e) {
                    return Err(e);
                }

                warn!(error = %e, delay_ms = delay, retries_left = retries, "Request failed, retrying");
                retries -= 1;
                sleep_with_jitter(delay, delay / 2).await;
                delay = next_delay(delay);
            }
        }
    }
}

fn next_delay(delay_ms: u64) -> u64 {
    delay_ms.saturating_mul(2)
}
