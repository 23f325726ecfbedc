use clap::Args;

use crate::cli::op::EsBackendError;

/// Delete whole sets.
#[derive(Args, Debug, Clone)]
pub struct Del {
    /// Bucket to write to
    pub bucket: String,

    /// Keys whose sets are deleted
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DelError {
    #[error("Backend error: {0}")]
    Backend(#[from] EsBackendError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Del {
    type Error = DelError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let backend = &ctx.backend;
        let mut tx = backend.begin();
        backend.del(&mut tx, &self.bucket, &self.keys)?;
        backend.end(tx).await?;

        Ok(format!(
            "Deleted {} key(s) from {}",
            self.keys.len(),
            self.bucket
        ))
    }
}
