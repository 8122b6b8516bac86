//! Exhibit operations over the exhibits document
//!
//! Every mutating operation runs inside `RecordStore::mutate`, so the
//! load → change → save sequence is serialized per document and a failed
//! save leaves nothing behind.

use crate::error::{Error, Result};
use crate::exhibits::types::*;
use crate::records::{Document, RecordStore};
use std::path::PathBuf;

/// Exhibits collection backed by a JSON document
pub struct ExhibitService {
    store: RecordStore<Exhibit>,
}

impl ExhibitService {
    /// Create a service for the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::new(path),
        }
    }

    /// Underlying record store
    pub fn store(&self) -> &RecordStore<Exhibit> {
        &self.store
    }

    /// Full document, unmodified
    pub async fn list(&self) -> Result<Document<Exhibit>> {
        self.store.load().await
    }

    /// Create an exhibit, returning its slug and stored record
    pub async fn create(&self, request: NewExhibit) -> Result<(String, Exhibit)> {
        if request.title.trim().is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }

        let (slug, exhibit) = self
            .store
            .mutate(|doc| {
                let slug = unique_slug(&base_slug(&request.title), doc);
                let exhibit = request.into_exhibit(timestamp_now());
                doc.insert(slug.clone(), exhibit.clone());
                Ok((slug, exhibit))
            })
            .await?;

        tracing::info!(slug = %slug, "Exhibit created");
        Ok((slug, exhibit))
    }

    /// Apply a whitelisted partial update
    pub async fn update(&self, slug: &str, patch: ExhibitPatch) -> Result<Exhibit> {
        if matches!(&patch.title, Some(title) if title.trim().is_empty()) {
            return Err(Error::Validation("Title is required".to_string()));
        }

        let exhibit = self
            .store
            .mutate(|doc| {
                let exhibit = find_mut(doc, slug)?;
                patch.apply(exhibit);
                exhibit.updated_at = Some(timestamp_now());
                Ok(exhibit.clone())
            })
            .await?;

        tracing::info!(slug, "Exhibit updated");
        Ok(exhibit)
    }

    /// Remove an exhibit
    pub async fn delete(&self, slug: &str) -> Result<()> {
        self.store
            .mutate(|doc| {
                doc.remove(slug).ok_or_else(not_found)?;
                Ok(())
            })
            .await?;

        tracing::info!(slug, "Exhibit deleted");
        Ok(())
    }

    /// Replace an exhibit's artwork sequence wholesale
    pub async fn reorder(&self, slug: &str, artworks: Vec<String>) -> Result<Exhibit> {
        self.reorder_with(slug, || Ok(artworks)).await
    }

    /// Like [`reorder`](Self::reorder), producing the sequence only once the
    /// exhibit is known to exist, so an unknown slug reports `NotFound`
    /// before any complaint about the sequence itself.
    pub async fn reorder_with<F>(&self, slug: &str, artworks: F) -> Result<Exhibit>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        let exhibit = self
            .store
            .mutate(|doc| {
                let exhibit = find_mut(doc, slug)?;
                exhibit.artworks = artworks()?;
                exhibit.updated_at = Some(timestamp_now());
                Ok(exhibit.clone())
            })
            .await?;

        tracing::info!(slug, artworks = exhibit.artworks.len(), "Exhibit reordered");
        Ok(exhibit)
    }
}

fn not_found() -> Error {
    Error::NotFound("Exhibit not found".to_string())
}

fn find_mut<'a>(doc: &'a mut Document<Exhibit>, slug: &str) -> Result<&'a mut Exhibit> {
    if slug.is_empty() {
        return Err(not_found());
    }
    doc.get_mut(slug).ok_or_else(not_found)
}

/// Slug derived from the title, or a timestamp fallback when nothing is left
fn base_slug(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("exhibit-{}", chrono::Utc::now().timestamp())
    } else {
        slug
    }
}

/// First of `base`, `base-2`, `base-3`, … not present in `doc`
fn unique_slug<T>(base: &str, doc: &Document<T>) -> String {
    if !doc.contains_key(base) {
        return base.to_string();
    }
    (2u64..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !doc.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}
