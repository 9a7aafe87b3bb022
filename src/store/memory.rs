use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::EventBackend;
use crate::models::Event;
use crate::utils::error::StoreError;

/// In-process authoritative store. Keeps insertion order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    events: RwLock<Vec<Event>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventBackend for MemoryBackend {
    async fn fetch_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.read().await.clone())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let events = self.events.read().await;
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    async fn insert(&self, event: &Event) -> Result<Event, StoreError> {
        let mut events = self.events.write().await;
        if events.iter().any(|e| e.id == event.id) {
            return Err(StoreError::Conflict(event.id));
        }
        events.push(event.clone());
        Ok(event.clone())
    }

    async fn replace(&self, event: &Event) -> Result<Option<Event>, StoreError> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(Some(event.clone()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() != before)
    }
}
