use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{Event, EventDraft};
use crate::store::EventBackend;
use crate::utils::error::{AppError, EventError};
use crate::utils::response::{created, no_content, success};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn EventBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn EventBackend>) -> Self {
        Self { backend }
    }
}

/// Body of `POST /api/events`. Clients may pick the id themselves; any
/// status in the body is ignored because new events always start pending.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub draft: EventDraft,
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.backend.fetch_all().await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let details = body.draft.validate()?;
    let event = Event::new(body.id.unwrap_or_else(Uuid::new_v4), details);

    let stored = state.backend.insert(&event).await?;
    info!(event_id = %stored.id, "Event created");

    Ok(created(stored, "Event created"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state
        .backend
        .fetch(id)
        .await?
        .ok_or(EventError::NotFound(id))?;
    Ok(success(event, "Event retrieved"))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<EventDraft>,
) -> Result<Response, AppError> {
    let current = state
        .backend
        .fetch(id)
        .await?
        .ok_or(EventError::NotFound(id))?;
    let revised = current.revise(&draft)?;

    let stored = state
        .backend
        .replace(&revised)
        .await?
        .ok_or(EventError::NotFound(id))?;
    info!(event_id = %id, status = %stored.status, "Event updated");

    Ok(success(stored, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    if !state.backend.remove(id).await? {
        return Err(EventError::NotFound(id).into());
    }
    info!(event_id = %id, "Event deleted");

    Ok(no_content())
}
