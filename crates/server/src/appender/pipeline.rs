use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{AuthorizationContext, ClaimsAppender};
use crate::cancel::until_cancelled;
use crate::error::PipelineError;

/// Appenders in registration order. Order is part of the contract: each
/// appender sees everything the earlier ones added.
#[derive(Default, Clone)]
pub struct ClaimsAppenderPipeline {
    appenders: Vec<Arc<dyn ClaimsAppender>>,
}

impl ClaimsAppenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, appender: Arc<dyn ClaimsAppender>) -> Self {
        self.appenders.push(appender);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.appenders.iter().map(|a| a.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.appenders.is_empty()
    }

    /// Run every appender in turn on the same context. Stops at the first failure.
    pub async fn run(
        &self,
        ctx: &mut AuthorizationContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        for appender in &self.appenders {
            let name = appender.name();
            until_cancelled(cancel, async {
                appender
                    .append_claims(&mut *ctx)
                    .await
                    .map_err(|source| PipelineError::Appender {
                        appender: name,
                        source,
                    })
            })
            .await?;
            tracing::trace!(appender = name, "Appender finished");
        }
        Ok(())
    }
}
