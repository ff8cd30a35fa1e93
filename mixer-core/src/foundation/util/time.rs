use crate::foundation::MixError;
use std::time::Duration;

/// `None` for a zero second count, which disables the corresponding deadline.
pub fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Runs `fut` under an optional deadline; expiry becomes `MixError::Timeout` for `phase`.
pub async fn with_deadline<T, F>(limit: Option<Duration>, phase: &str, fut: F) -> Result<T, MixError>
where
    F: std::future::Future<Output = Result<T, MixError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| MixError::Timeout { phase: phase.to_string(), timeout_secs: limit.as_secs() })?,
        None => fut.await,
    }
}
