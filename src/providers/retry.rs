// Bounded retry with exponential backoff

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::errors::GatewayError;

/// Hard ceiling on attempts; gateway calls are never repeated more than this
pub const MAX_ATTEMPTS: u32 = 2;
const BASE_DELAY_MS: u64 = 500;

/// Run `f` up to `attempts` times (clamped to `1..=MAX_ATTEMPTS`), retrying
/// only errors that report themselves retryable.
pub async fn with_retry<F, Fut, T>(attempts: u32, f: F) -> Result<T, GatewayError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let attempts = attempts.clamp(1, MAX_ATTEMPTS);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < attempts && e.is_retryable() => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt - 1));
                tracing::warn!(
                    "Gateway request failed (attempt {}/{}): {}; retrying in {:?}",
                    attempt,
                    attempts,
                    e,
                    delay
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
