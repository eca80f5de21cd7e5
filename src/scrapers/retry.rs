use crate::errors::{Result, DataHubError};
use crate::models::WorkUnit;
use log::warn;
use std::future::Future;
use std::time::Duration;

/// 对一个工作单元整体重试，每次都从头开始；
/// 只有网络类错误才会重试，其余错误立即返回
pub async fn with_retry<T, F, Fut>(
    unit: &WorkUnit,
    max_attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                return Err(DataHubError::FetchError {
                    unit: unit.to_string(),
                    attempts: attempt,
                    cause: Box::new(e),
                });
            }
            Err(e) => {
                warn!(
                    "Attempt {}/{} for {} failed: {}",
                    attempt, max_attempts, unit, e
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
