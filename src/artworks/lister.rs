//! Artwork listing with thumbnail resolution

use crate::artworks::source::ArtworkSource;
use crate::artworks::types::*;
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Lists original artworks from an `ArtworkSource`
pub struct ArtworkLister {
    source: Arc<dyn ArtworkSource>,
    uploads_url: String,
    meta_path: Option<PathBuf>,
    derivative: Regex,
}

impl ArtworkLister {
    /// Create a lister serving files under `uploads_url`
    pub fn new(source: Arc<dyn ArtworkSource>, uploads_url: &str) -> Result<Self> {
        let derivative = Regex::new(DERIVATIVE_PATTERN)
            .map_err(|e| Error::Config(format!("Invalid derivative pattern: {}", e)))?;

        Ok(Self {
            source,
            uploads_url: uploads_url.trim_end_matches('/').to_string(),
            meta_path: None,
            derivative,
        })
    }

    /// Read titles from a metadata document keyed by filename
    pub fn with_meta_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.meta_path = Some(path.into());
        self
    }

    /// Original artworks sorted by filename
    pub async fn list(&self) -> Result<Vec<ArtworkEntry>> {
        let files = self.source.list_candidate_files().await?;
        let present: HashSet<&str> = files.iter().map(String::as_str).collect();
        let meta = self.load_meta().await;

        let mut originals: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|name| is_image(name) && !self.derivative.is_match(name))
            .collect();
        originals.sort_unstable();
        originals.dedup();

        Ok(originals
            .into_iter()
            .map(|name| {
                let (stem, ext) = split_name(name);
                let small = format!("{}_small.{}", stem, ext);
                let thumbnail = if present.contains(small.as_str()) {
                    format!("{}/{}", self.uploads_url, small)
                } else {
                    format!("{}/{}", self.uploads_url, name)
                };
                let title = meta
                    .get(name)
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .unwrap_or(stem)
                    .to_string();

                ArtworkEntry {
                    original: name.to_string(),
                    thumbnail,
                    title,
                }
            })
            .collect())
    }

    /// Titles keyed by filename. Missing or unreadable metadata yields none,
    /// and an entry without a string title is skipped on its own.
    async fn load_meta(&self) -> HashMap<String, String> {
        let Some(path) = &self.meta_path else {
            return HashMap::new();
        };

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read artwork metadata {}: {}", path.display(), e);
                return HashMap::new();
            }
        };

        if content.trim().is_empty() {
            return HashMap::new();
        }

        let entries: HashMap<String, Value> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Ignoring corrupt artwork metadata {}: {}", path.display(), e);
                return HashMap::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|(name, entry)| {
                let title = entry.get("title").and_then(Value::as_str)?.to_string();
                Some((name, title))
            })
            .collect()
    }
}

fn split_name(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or((name, ""))
}

fn is_image(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}
