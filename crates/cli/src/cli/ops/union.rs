use clap::Args;

use crate::cli::op::EsBackendError;

/// Print the union of the values stored for several keys.
#[derive(Args, Debug, Clone)]
pub struct Union {
    /// Bucket to read from
    pub bucket: String,

    /// Keys whose sets are merged
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UnionError {
    #[error("Backend error: {0}")]
    Backend(#[from] EsBackendError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Union {
    type Error = UnionError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let values = ctx.backend.union(&self.bucket, &self.keys).await?;
        Ok(super::lines(values))
    }
}
