//! The event store adapter: sole owner of the event collection.
//!
//! Every mutation goes to the authoritative backend first. Only once the
//! backend has accepted it does the owned collection change, and then the
//! whole collection is written to the mirror. Reads from the mirror happen
//! only when listing and the backend cannot be reached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::lifecycle;
use crate::models::{Event, EventDraft, EventStatus};
use crate::utils::error::{EventError, StoreError};

pub mod http;
pub mod memory;
pub mod mirror;

pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use mirror::{FileKeyValue, KeyValueStore, MemoryKeyValue, Mirror};

/// Authoritative event persistence. Absence is reported as `None`/`false`,
/// never as an error.
#[async_trait]
pub trait EventBackend: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Event>, StoreError>;

    async fn fetch(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn insert(&self, event: &Event) -> Result<Event, StoreError>;

    async fn replace(&self, event: &Event) -> Result<Option<Event>, StoreError>;

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T> EventBackend for Arc<T>
where
    T: EventBackend + ?Sized,
{
    async fn fetch_all(&self) -> Result<Vec<Event>, StoreError> {
        (**self).fetch_all().await
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        (**self).fetch(id).await
    }

    async fn insert(&self, event: &Event) -> Result<Event, StoreError> {
        (**self).insert(event).await
    }

    async fn replace(&self, event: &Event) -> Result<Option<Event>, StoreError> {
        (**self).replace(event).await
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        (**self).remove(id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Backend,
    Mirror,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Backend => f.write_str("backend"),
            Source::Mirror => f.write_str("mirror"),
        }
    }
}

/// Result of `list`.
///
/// `stale` is set when the response was overtaken by a newer change to
/// the collection and was therefore discarded; `events` then holds the
/// current collection instead of the late response.
#[derive(Debug, Clone)]
pub struct Listing {
    pub events: Vec<Event>,
    pub source: Source,
    pub ticket: u64,
    pub stale: bool,
}

#[derive(Debug, Default)]
struct Collection {
    events: Vec<Event>,
    applied: u64,
}

pub struct EventStore<B> {
    backend: B,
    mirror: Option<Mirror>,
    collection: RwLock<Collection>,
    tickets: AtomicU64,
}

impl<B: EventBackend> EventStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mirror: None,
            collection: RwLock::new(Collection::default()),
            tickets: AtomicU64::new(0),
        }
    }

    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy of the owned collection as last reconciled.
    pub async fn snapshot(&self) -> Vec<Event> {
        self.collection.read().await.events.clone()
    }

    pub async fn create(&self, draft: &EventDraft) -> Result<Event, EventError> {
        let details = draft.validate()?;
        let event = Event::new(Uuid::new_v4(), details);

        let stored = self.backend.insert(&event).await?;
        // A listing may have picked the event up already.
        self.commit(|events| upsert(events, &stored)).await;

        info!(event_id = %stored.id, title = %stored.details.title, "Event created");
        Ok(stored)
    }

    pub async fn list(&self) -> Result<Listing, EventError> {
        let ticket = self.next_ticket();

        let err = match self.backend.fetch_all().await {
            Ok(events) => return Ok(self.reconcile(ticket, events, Source::Backend).await),
            Err(err) => err,
        };

        let Some(mirror) = &self.mirror else {
            return Err(err.into());
        };

        warn!(error = %err, "Backend unreachable, listing from mirror");
        match mirror.load().await {
            Ok(Some(events)) => Ok(self.reconcile(ticket, events, Source::Mirror).await),
            Ok(None) => {
                debug!("Mirror is empty");
                Err(err.into())
            }
            Err(mirror_err) => {
                warn!(error = %mirror_err, "Mirror unreadable");
                Err(err.into())
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Event, EventError> {
        debug!(event_id = %id, "Fetching event");
        self.backend
            .fetch(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    /// Replaces the event's fields. The status only changes when the draft
    /// asks for a different, legal one.
    pub async fn update(&self, id: Uuid, draft: &EventDraft) -> Result<Event, EventError> {
        draft.validate()?;

        let current = self.get(id).await?;
        let revised = current.revise(draft)?;
        let stored = self
            .backend
            .replace(&revised)
            .await?
            .ok_or(EventError::NotFound(id))?;

        self.commit(|events| upsert(events, &stored)).await;

        info!(event_id = %id, status = %stored.status, "Event updated");
        Ok(stored)
    }

    pub async fn transition(&self, id: Uuid, to: EventStatus) -> Result<Event, EventError> {
        let missing = EventError::IllegalTransition { from: None, to };

        let Some(current) = self.backend.fetch(id).await? else {
            debug!(event_id = %id, %to, "Status change on missing event");
            return Err(missing);
        };
        let status = lifecycle::transition(current.status, to)?;

        let next = Event { status, ..current };
        let Some(stored) = self.backend.replace(&next).await? else {
            debug!(event_id = %id, %to, "Event vanished during status change");
            return Err(missing);
        };

        self.commit(|events| upsert(events, &stored)).await;

        info!(event_id = %id, status = %stored.status, "Event status changed");
        Ok(stored)
    }

    pub async fn approve(&self, id: Uuid) -> Result<Event, EventError> {
        self.transition(id, EventStatus::Approved).await
    }

    pub async fn reject(&self, id: Uuid) -> Result<Event, EventError> {
        self.transition(id, EventStatus::Rejected).await
    }

    /// A second delete of the same id fails with `NotFound`; callers should
    /// read that as "already gone".
    pub async fn delete(&self, id: Uuid) -> Result<(), EventError> {
        if !self.backend.remove(id).await? {
            return Err(EventError::NotFound(id));
        }

        self.commit(|events| events.retain(|e| e.id != id)).await;

        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies a mutation the backend has already accepted.
    async fn commit(&self, apply: impl FnOnce(&mut Vec<Event>)) {
        let mut collection = self.collection.write().await;
        apply(&mut collection.events);
        collection.applied = self.next_ticket();
        self.write_mirror(&collection.events).await;
    }

    async fn reconcile(&self, ticket: u64, events: Vec<Event>, source: Source) -> Listing {
        let mut collection = self.collection.write().await;

        if ticket < collection.applied {
            debug!(ticket, applied = collection.applied, %source, "Discarding stale listing");
            return Listing {
                events: collection.events.clone(),
                source,
                ticket,
                stale: true,
            };
        }

        collection.events = events;
        collection.applied = ticket;
        if source == Source::Backend {
            self.write_mirror(&collection.events).await;
        }

        debug!(count = collection.events.len(), %source, "Listing applied");
        Listing {
            events: collection.events.clone(),
            source,
            ticket,
            stale: false,
        }
    }

    async fn write_mirror(&self, events: &[Event]) {
        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.save(events).await {
                warn!(error = %e, "Mirror write failed, will rewrite on next change");
            }
        }
    }
}

fn upsert(events: &mut Vec<Event>, event: &Event) {
    match events.iter_mut().find(|e| e.id == event.id) {
        Some(slot) => *slot = event.clone(),
        None => events.push(event.clone()),
    }
}
