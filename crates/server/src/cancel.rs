use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// Run `fut` unless `cancel` fires first. A fired token wins ties.
pub async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        result = fut => result,
    }
}
