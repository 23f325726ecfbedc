use clap::Args;

use crate::cli::op::EsBackendError;

/// Remove values from the set owned by a key.
#[derive(Args, Debug, Clone)]
pub struct Remove {
    /// Bucket to write to
    pub bucket: String,

    /// Key owning the set
    pub key: String,

    /// Values to remove
    #[arg(required = true)]
    pub values: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveError {
    #[error("Backend error: {0}")]
    Backend(#[from] EsBackendError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Remove {
    type Error = RemoveError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let backend = &ctx.backend;
        let mut tx = backend.begin();
        backend.remove(&mut tx, &self.bucket, self.key.as_str(), &self.values)?;
        backend.end(tx).await?;

        Ok(format!(
            "Removed {} value(s) from {}/{}",
            self.values.len(),
            self.bucket,
            self.key
        ))
    }
}
