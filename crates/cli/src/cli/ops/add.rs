use clap::Args;

use crate::cli::op::EsBackendError;

/// Add values to the set owned by a key.
#[derive(Args, Debug, Clone)]
pub struct Add {
    /// Bucket to write to
    pub bucket: String,

    /// Key owning the set
    pub key: String,

    /// Values to add
    #[arg(required = true)]
    pub values: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error("Backend error: {0}")]
    Backend(#[from] EsBackendError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Add {
    type Error = AddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let backend = &ctx.backend;
        let mut tx = backend.begin();
        backend.add(&mut tx, &self.bucket, self.key.as_str(), &self.values)?;
        backend.end(tx).await?;

        Ok(format!(
            "Added {} value(s) to {}/{}",
            self.values.len(),
            self.bucket,
            self.key
        ))
    }
}
