pub mod event;

pub use event::{Event, EventDetails, EventDraft, EventField, EventStatus};
