//! Community event board.
//!
//! The core is the event lifecycle and the client-side state kept in step
//! with an authoritative backend: [`store::EventStore`] owns the event
//! collection, [`pagination::Pager`] derives pages from it,
//! [`session::EditSession`] edits one event at a time and [`lifecycle`]
//! gates status changes. [`routes`] serves the backend API over HTTP.

pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod session;
pub mod store;
pub mod utils;

pub use models::{Event, EventDetails, EventDraft, EventField, EventStatus};
pub use pagination::{PageView, Pager};
pub use session::{EditSession, EditState};
pub use store::{EventBackend, EventStore, Listing, Source};
pub use utils::error::{AppError, EventError, StoreError};
