use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    ChatRequest, ChatResponse, FunFactResponse, GreetingResponse, HealthResponse, Transport,
};
use crate::error::TransportError;

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self.client.get(&url).send().await?;
        decode(response).await
    }
}

/// Reject anything outside 2xx, then parse the body
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    if !response.status().is_success() {
        return Err(TransportError::status(response.status().as_u16()));
    }

    let body = response.json::<T>().await?;
    Ok(body)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let url = format!("{}/chat", self.base_url);
        debug!(%url, history = request.chat_history.len(), "POST");

        let response = self.client.post(&url).json(request).send().await?;
        decode(response).await
    }

    async fn greeting(&self) -> Result<GreetingResponse, TransportError> {
        self.get_json("/greeting").await
    }

    async fn fun_fact(&self) -> Result<FunFactResponse, TransportError> {
        self.get_json("/fun-fact").await
    }

    async fn health(&self) -> Result<HealthResponse, TransportError> {
        self.get_json("/health").await
    }
}
