use clap::Args;

use crate::cli::op::EsBackendError;

/// Print the values stored for a key.
#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Bucket to read from
    pub bucket: String,

    /// Key owning the set
    pub key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("Backend error: {0}")]
    Backend(#[from] EsBackendError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = GetError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let values = ctx.backend.get(&self.bucket, self.key.as_str()).await?;
        Ok(super::lines(values))
    }
}
