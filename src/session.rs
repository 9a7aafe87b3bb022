//! Inline editing of a single list item.
//!
//! At most one edit is active at a time. Starting another edit drops the
//! current draft without saving it.

use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Event, EventDraft, EventField, EventStatus};
use crate::store::{EventBackend, EventStore};
use crate::utils::error::EventError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing { target: Uuid, draft: EventDraft },
}

#[derive(Debug, Default)]
pub struct EditSession {
    state: EditState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn target(&self) -> Option<Uuid> {
        match &self.state {
            EditState::Editing { target, .. } => Some(*target),
            EditState::Idle => None,
        }
    }

    pub fn draft(&self) -> Option<&EventDraft> {
        match &self.state {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Idle => None,
        }
    }

    /// Starts editing `event`. Returns the id whose draft was discarded, if
    /// another edit was in progress.
    pub fn begin(&mut self, event: &Event) -> Option<Uuid> {
        let previous = self.target();
        if let Some(id) = previous {
            debug!(event_id = %id, "Discarding unsaved draft");
        }

        // Status stays unset until the user asks for one, so a status change
        // made elsewhere while editing is kept on save.
        let draft = EventDraft {
            status: None,
            ..EventDraft::from(event)
        };
        self.state = EditState::Editing {
            target: event.id,
            draft,
        };
        previous
    }

    /// Updates one draft field. Nothing is validated until `save`.
    pub fn set_field(&mut self, field: EventField, value: impl Into<String>) -> Result<(), EventError> {
        match &mut self.state {
            EditState::Editing { draft, .. } => {
                draft.set(field, value);
                Ok(())
            }
            EditState::Idle => Err(EventError::NotEditing),
        }
    }

    pub fn set_status(&mut self, status: EventStatus) -> Result<(), EventError> {
        match &mut self.state {
            EditState::Editing { draft, .. } => {
                draft.status = Some(status);
                Ok(())
            }
            EditState::Idle => Err(EventError::NotEditing),
        }
    }

    /// Writes the draft back through the store.
    ///
    /// Validation and transient store failures keep the session editing so
    /// the user can fix or retry. `NotFound` ends the session: the target is
    /// gone and the draft must not bring it back.
    pub async fn save<B: EventBackend>(&mut self, store: &EventStore<B>) -> Result<Event, EventError> {
        let EditState::Editing { target, draft } = &self.state else {
            return Err(EventError::NotEditing);
        };
        let target = *target;

        draft.validate()?;

        match store.update(target, draft).await {
            Ok(saved) => {
                self.state = EditState::Idle;
                info!(event_id = %target, "Inline edit saved");
                Ok(saved)
            }
            Err(err @ EventError::NotFound(_)) => {
                self.state = EditState::Idle;
                debug!(event_id = %target, "Edit target vanished, draft dropped");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns `false` if nothing was being edited.
    pub fn cancel(&mut self) -> bool {
        let was_editing = self.is_editing();
        self.state = EditState::Idle;
        was_editing
    }
}
