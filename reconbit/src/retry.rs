use core::future::Future;

/// Re-runs the whole operation while its error is `retryable`, sleeping `delay` between attempts.
/// Non-retryable errors and the error of the last attempt are returned as they are.
pub async fn retry_with_delay<F, Fut, T, E, R>(
    attempts: usize,
    delay: std::time::Duration,
    retryable: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    assert!(attempts >= 1);
    let mut left = attempts;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if left > 1 && retryable(&e) => {
                left -= 1;
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
