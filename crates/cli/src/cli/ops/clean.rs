use clap::Args;

use crate::cli::op::EsBackendError;

/// Drop every bucket under the configured index.
#[derive(Args, Debug, Clone)]
pub struct Clean {
    /// Required; there is no undo
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("Backend error: {0}")]
    Backend(#[from] EsBackendError),
    #[error("Refusing to clean without --yes")]
    NotConfirmed,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Clean {
    type Error = CleanError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if !self.yes {
            return Err(CleanError::NotConfirmed);
        }
        ctx.backend.clean().await?;
        Ok(format!("Cleaned index '{}'", ctx.backend.config().index))
    }
}
