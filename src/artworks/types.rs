//! Artwork listing types

use serde::Serialize;

/// File extensions accepted as original artworks (compared lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Derived renditions written alongside each upload
pub const DERIVATIVE_PATTERN: &str = r"_(large|medium|small|social|map)\.[^.]+$";

/// One original artwork with its thumbnail URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtworkEntry {
    pub original: String,
    pub thumbnail: String,
    pub title: String,
}
