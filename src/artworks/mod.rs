//! Artworks module — read-only listing of uploaded artwork images
//!
//! Originals are discovered through an `ArtworkSource`; derived renditions
//! (`_large`, `_medium`, `_small`, `_social`, `_map`) are hidden and the
//! `_small` rendition is used as thumbnail when present.

pub mod handler;
pub mod lister;
pub mod source;
pub mod types;

pub use handler::{artworks_router, ArtworksState};
pub use lister::ArtworkLister;
pub use source::{ArtworkSource, FsArtworkSource, StaticArtworkSource};
pub use types::ArtworkEntry;
