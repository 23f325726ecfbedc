//! Elasticsearch persistence over its REST API.

mod client;
mod error;
pub mod wire;

pub use client::ElasticsearchClient;
pub use error::ElasticsearchError;
