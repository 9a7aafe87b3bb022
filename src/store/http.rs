use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::{EventBackend, EventStore, Mirror};
use crate::config::Config;
use crate::models::{Event, EventDraft};
use crate::utils::error::StoreError;
use crate::utils::response::{ApiErrorResponse, ApiResponse};

/// Client for the `/api/events` resource.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn events_url(&self) -> String {
        format!("{}/api/events", self.base_url)
    }

    fn event_url(&self, id: Uuid) -> String {
        format!("{}/api/events/{}", self.base_url, id)
    }
}

impl EventStore<HttpBackend> {
    /// Store backed by the configured API, mirrored to disk when a mirror
    /// directory is set.
    pub fn from_config(config: &Config) -> Self {
        let store = EventStore::new(HttpBackend::new(&config.api_url));
        match &config.mirror_dir {
            Some(dir) => store.with_mirror(Mirror::in_dir(dir)),
            None => store,
        }
    }
}

async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    let envelope: ApiResponse<T> = response.json().await?;
    envelope.data.ok_or_else(|| StoreError::Status {
        status: status.as_u16(),
        message: "response carried no data".to_string(),
    })
}

/// Turns a failed response into a store error, keeping the server's error
/// code when the body is the API error envelope.
async fn unexpected(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return e.into(),
    };

    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) => StoreError::Rejected {
            code: parsed.error.code,
            message: parsed.error.message,
            details: parsed.error.details,
        },
        Err(_) => StoreError::Status {
            status,
            message: body,
        },
    }
}

#[async_trait]
impl EventBackend for HttpBackend {
    async fn fetch_all(&self) -> Result<Vec<Event>, StoreError> {
        let response = self.http.get(self.events_url()).send().await?;
        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }
        let events: Vec<Event> = read_data(response).await?;
        debug!(count = events.len(), "Fetched events");
        Ok(events)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let response = self.http.get(self.event_url(id)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(read_data(response).await?)),
            _ => Err(unexpected(response).await),
        }
    }

    async fn insert(&self, event: &Event) -> Result<Event, StoreError> {
        let response = self
            .http
            .post(self.events_url())
            .json(event)
            .send()
            .await?;
        match response.status() {
            StatusCode::CONFLICT => Err(StoreError::Conflict(event.id)),
            s if s.is_success() => read_data(response).await,
            _ => Err(unexpected(response).await),
        }
    }

    async fn replace(&self, event: &Event) -> Result<Option<Event>, StoreError> {
        let response = self
            .http
            .put(self.event_url(event.id))
            .json(&EventDraft::from(event))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(read_data(response).await?)),
            _ => Err(unexpected(response).await),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let response = self.http.delete(self.event_url(id)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            _ => Err(unexpected(response).await),
        }
    }
}
