use crate::config::HTTP_TIMEOUT;
use anyhow::Result;
use async_trait::async_trait;

pub type HttpClient = reqwest::Client;

const USER_AGENT: &str = concat!("fedboard/", env!("CARGO_PKG_VERSION"));

/// Shared client for both upstreams; every request inherits the 15 second timeout.
pub fn build_client() -> Result<HttpClient> {
    let client = reqwest::ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    Ok(client)
}

/// One authenticated GET against an upstream, decoded into `T`.
#[async_trait]
pub trait Http<T> {
    type Query: Send + Sync;

    async fn fetch(&self, http_client: &HttpClient, query: &Self::Query) -> Result<T>;
}
