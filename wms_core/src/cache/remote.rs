//! A cache on top of the Upstash Redis REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Response};
use serde::Deserialize;

use crate::{cache::Cache, error::CacheError, skip::SkipLocation};

/// The envelope of every Upstash reply. `GET` of a missing key yields `null`.
#[derive(Debug, Deserialize)]
struct CommandResult {
    result: Option<String>,
}

pub struct RemoteCache {
    client: reqwest::Client,
    rest_url: String,
    rest_token: String,
}

impl std::fmt::Debug for RemoteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCache")
            .field("rest_url", &self.rest_url)
            .field("rest_token", &"[redacted]")
            .finish()
    }
}

impl RemoteCache {
    pub fn new(
        client: reqwest::Client,
        rest_url: impl Into<String>,
        rest_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            rest_url: rest_url.into().trim_end_matches('/').to_string(),
            rest_token: rest_token.into(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.rest_token)
    }
}

/// Turn a non-200 reply into an error carrying its body.
async fn check_status(response: Response) -> Result<Response, CacheError> {
    if response.status() == reqwest::StatusCode::OK {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(CacheError::UnexpectedStatus { status, body })
}

#[async_trait]
impl Cache for RemoteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<SkipLocation>>, CacheError> {
        let response = self
            .client
            .get(format!("{}/get/{key}", self.rest_url))
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        let reply: CommandResult = serde_json::from_str(&body).map_err(CacheError::Decode)?;
        let Some(value) = reply.result else {
            return Ok(None);
        };
        let locations = serde_json::from_str(&value).map_err(CacheError::Decode)?;
        Ok(Some(locations))
    }

    async fn set(&self, key: &str, value: &[SkipLocation], ttl: Duration) -> Result<(), CacheError> {
        let body = serde_json::to_string(value).map_err(CacheError::Serialize)?;
        let response = self
            .client
            .post(format!("{}/setex/{key}/{}", self.rest_url, ttl.as_secs()))
            .header(AUTHORIZATION, self.bearer())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
