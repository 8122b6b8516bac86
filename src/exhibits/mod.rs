//! Exhibits module — curated groupings of artworks
//!
//! Provides the action-dispatched `/api/exhibits` endpoint on top of an
//! `ExhibitService` that persists every exhibit in one JSON document.

pub mod handler;
pub mod service;
pub mod types;

pub use handler::{exhibits_router, ExhibitsState};
pub use service::ExhibitService;
