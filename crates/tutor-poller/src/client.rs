//! HTTP implementation of [`GenerationApi`] against the tutoring API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use tutor_core::{Error, GenerationApi, GenerationStatus, Result, StatusLookup};

use crate::config::ClientConfig;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-backed generation client.
#[derive(Clone)]
pub struct HttpGenerationClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGenerationClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api/v1{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, op: &'static str, builder: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Request(format!("{} failed: {}", op, e)))?;

        let status = response.status();
        debug!(
            subsystem = "poller",
            component = "http_client",
            op,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generation API call"
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        warn!(
            subsystem = "poller",
            component = "http_client",
            op,
            status = status.as_u16(),
            error = %message,
            "Generation API returned an error"
        );
        Err(map_status(status, message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(op, builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(format!("{}: invalid response body: {}", op, e)))
    }
}

fn map_status(status: StatusCode, message: String) -> Error {
    match status {
        StatusCode::BAD_REQUEST => Error::InvalidInput(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::CONFLICT => Error::Conflict(message),
        _ => Error::Request(format!("HTTP {}: {}", status, message)),
    }
}

#[async_trait]
impl GenerationApi for HttpGenerationClient {
    async fn start_generation(&self, user_id: i64, subject_id: i64) -> Result<()> {
        let path = format!("/users/{}/subjects/{}/generation", user_id, subject_id);
        self.send("start_generation", self.request(Method::POST, &path))
            .await
            .map(|_| ())
    }

    async fn start_all_generation(&self, user_id: i64) -> Result<()> {
        let path = format!("/users/{}/generation", user_id);
        self.send("start_all_generation", self.request(Method::POST, &path))
            .await
            .map(|_| ())
    }

    async fn fetch_status(&self, user_id: i64, subject_id: i64) -> Result<StatusLookup> {
        let path = format!("/users/{}/subjects/{}/generation", user_id, subject_id);
        self.send_json("fetch_status", self.request(Method::GET, &path))
            .await
    }

    async fn fetch_all_statuses(&self, user_id: i64) -> Result<Vec<GenerationStatus>> {
        let path = format!("/users/{}/generation", user_id);
        self.send_json("fetch_all_statuses", self.request(Method::GET, &path))
            .await
    }

    async fn reset_generation(&self, user_id: i64, subject_id: i64) -> Result<()> {
        let path = format!("/users/{}/subjects/{}/generation", user_id, subject_id);
        self.send("reset_generation", self.request(Method::DELETE, &path))
            .await
            .map(|_| ())
    }
}
