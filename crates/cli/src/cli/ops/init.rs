use clap::Args;

use acl_backend::ElasticsearchError;

/// Install the keyword index template for the configured index.
#[derive(Args, Debug, Clone)]
pub struct Init;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Elasticsearch error: {0}")]
    Elasticsearch(#[from] ElasticsearchError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let client = ctx.client();
        let info = client.info().await?;
        let version = info["version"]["number"].as_str().unwrap_or("unknown");

        let index = &ctx.backend.config().index;
        client.put_index_template(index).await?;

        Ok(format!(
            "Installed index template '{}' on {} (Elasticsearch {})",
            index,
            client.base_url(),
            version
        ))
    }
}
