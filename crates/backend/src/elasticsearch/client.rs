use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::error::ElasticsearchError;
use super::wire::{self, BulkResponse, DeleteByQueryResponse, SearchResponse};
use crate::document::Collection;
use crate::query::TermsQuery;
use crate::store::{BulkAction, BulkItem, DocumentStore, Refresh, SearchHits, StoreError};

type StoreResult<T> = Result<T, StoreError<ElasticsearchError>>;

/// [`DocumentStore`] over the Elasticsearch REST API.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    remote: Url,
    client: Client,
}

impl ElasticsearchClient {
    pub fn new(remote: &Url) -> Result<Self, ElasticsearchError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        let mut remote = remote.clone();
        if !remote.path().ends_with('/') {
            let path = format!("{}/", remote.path());
            remote.set_path(&path);
        }

        Ok(Self { remote, client })
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Install the keyword mapping for documents stored under `index`.
    ///
    /// Only indices created after the template is in place pick it up.
    pub async fn put_index_template(&self, index: &str) -> Result<(), ElasticsearchError> {
        let url = self.endpoint(&format!("_index_template/{}", index))?;
        info!(%index, "installing index template");
        let response = self
            .client
            .put(url)
            .json(&wire::index_template(index))
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Cluster banner, also a cheap reachability check.
    pub async fn info(&self) -> Result<Value, ElasticsearchError> {
        let response = self.client.get(self.remote.clone()).send().await?;
        Ok(expect_success(response).await?.json().await?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ElasticsearchError> {
        Ok(self.remote.join(path)?)
    }
}

#[async_trait]
impl DocumentStore for ElasticsearchClient {
    type Error = ElasticsearchError;

    async fn search(
        &self,
        collection: &Collection,
        query: &TermsQuery,
        size: usize,
    ) -> StoreResult<SearchHits> {
        let url = self.endpoint(&format!("{}/_search", collection.index()))?;
        debug!(%collection, size, "search");
        let response = self
            .client
            .post(url)
            .json(&wire::search_body(collection, query, size))
            .send()
            .await
            .map_err(ElasticsearchError::from)?;

        let body: SearchResponse = parse(response, collection.index()).await?;
        Ok(SearchHits {
            total: body.hits.total.value(),
            documents: body
                .hits
                .hits
                .into_iter()
                .map(|hit| hit.source.entry)
                .collect(),
        })
    }

    async fn bulk(&self, actions: Vec<BulkAction>, refresh: Refresh) -> StoreResult<Vec<BulkItem>> {
        if actions.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("_bulk")?;
        url.query_pairs_mut()
            .append_pair("refresh", refresh.as_param());
        let body = wire::bulk_body(&actions).map_err(ElasticsearchError::from)?;
        debug!(actions = actions.len(), %refresh, "bulk");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(ElasticsearchError::from)?;

        let body: BulkResponse = parse(response, "_bulk").await?;
        Ok(body.into_items())
    }

    async fn delete_by_query(
        &self,
        collection: &Collection,
        query: &TermsQuery,
        refresh: Refresh,
    ) -> StoreResult<u64> {
        let mut url = self.endpoint(&format!("{}/_delete_by_query", collection.index()))?;
        // wait_for is not accepted by this endpoint
        let refresh = match refresh {
            Refresh::False => "false",
            Refresh::True | Refresh::WaitFor => "true",
        };
        url.query_pairs_mut()
            .append_pair("refresh", refresh)
            .append_pair("conflicts", "proceed");
        debug!(%collection, refresh, "delete by query");

        let response = self
            .client
            .post(url)
            .json(&wire::delete_by_query_body(collection, query))
            .send()
            .await
            .map_err(ElasticsearchError::from)?;

        let body: DeleteByQueryResponse = parse(response, collection.index()).await?;
        Ok(body.deleted)
    }

    async fn delete_index(&self, index: &str) -> StoreResult<()> {
        let url = self.endpoint(index)?;
        info!(%index, "deleting index");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(ElasticsearchError::from)?;

        let _: Value = parse(response, index).await?;
        Ok(())
    }
}

async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> StoreResult<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ElasticsearchError::from)?;
    decode(status, &bytes, what)
}

/// Decode a response body by status: 404 is [`StoreError::NotFound`] for
/// `what`, any other failure status carries the body as text.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8], what: &str) -> StoreResult<T> {
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(what.to_owned()));
    }
    if !status.is_success() {
        return Err(StoreError::Provider(ElasticsearchError::HttpStatus(
            status,
            String::from_utf8_lossy(body).into_owned(),
        )));
    }
    Ok(serde_json::from_slice(body).map_err(ElasticsearchError::from)?)
}

async fn expect_success(response: Response) -> Result<Response, ElasticsearchError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ElasticsearchError::HttpStatus(
            response.status(),
            response.text().await?,
        ))
    }
}
