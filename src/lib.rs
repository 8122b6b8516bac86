//! Easel - Portfolio backend for a single artist
//!
//! Easel serves the private admin API behind an artist's portfolio site:
//! curated exhibits stored in a flat JSON document, a listing of uploaded
//! artwork images, and a session gate that guards every mutation with
//! CSRF verification and per-session rate limiting.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         HTTP API (axum)                       │
//! │   /api/csrf  /api/login  /api/logout  /api/artworks  /api/exhibits
//! └───────┬──────────────────────┬──────────────────┬────────────┘
//!         │                      │                  │
//! ┌───────▼────────┐   ┌─────────▼───────┐  ┌───────▼──────────┐
//! │ Security Gate  │   │ Artwork Lister  │  │ Exhibit Service  │
//! │ - CSRF tokens  │   │ - ArtworkSource │  │ - slugs          │
//! │ - rate limits  │   │ - thumbnails    │  │ - field whitelist│
//! │ - login        │   └─────────────────┘  └───────┬──────────┘
//! └───────┬────────┘                                │
//! ┌───────▼────────┐                       ┌────────▼─────────┐
//! │ Session Store  │                       │  Record Store    │
//! │ (in-process)   │                       │  (atomic JSON)   │
//! └────────────────┘                       └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`]: Unified router and JSON error mapping
//! - [`artworks`]: Uploaded artwork listing
//! - [`body`]: JSON and form request bodies as field maps
//! - [`exhibits`]: Exhibit CRUD and reordering
//! - [`records`]: Slug-keyed JSON documents with atomic persistence
//! - [`security`]: CSRF, rate limiting, and artist login
//! - [`session`]: Cookie-bound session state
//! - [`config`]: Configuration management

pub mod api;
pub mod artworks;
pub mod body;
pub mod config;
pub mod error;
pub mod exhibits;
pub mod records;
pub mod security;
pub mod session;

pub use config::EaselConfig;
pub use error::{Error, Result};
