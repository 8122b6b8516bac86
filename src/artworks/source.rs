//! Where artwork filenames come from

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Supplies the raw filenames of the upload directory.
///
/// Names are returned unfiltered, derivatives included, so the lister can
/// tell whether a `_small` rendition exists for a given original.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    async fn list_candidate_files(&self) -> Result<Vec<String>>;
}

/// Reads regular files from a directory on disk
pub struct FsArtworkSource {
    dir: PathBuf,
}

impl FsArtworkSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtworkSource for FsArtworkSource {
    async fn list_candidate_files(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Uploads directory {} does not exist", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// Fixed in-memory listing
#[derive(Debug, Clone, Default)]
pub struct StaticArtworkSource {
    files: Vec<String>,
}

impl StaticArtworkSource {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ArtworkSource for StaticArtworkSource {
    async fn list_candidate_files(&self) -> Result<Vec<String>> {
        Ok(self.files.clone())
    }
}
