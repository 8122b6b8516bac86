//! Easel configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Easel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EaselConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// On-disk layout of exhibits, uploads, and artwork metadata
    #[serde(default)]
    pub storage: StorageConfig,

    /// Artist authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Per-session rate limits
    #[serde(default)]
    pub rate_limit: RateLimitsConfig,

    /// Session lifetime
    #[serde(default)]
    pub session: SessionConfig,
}

impl EaselConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,

    /// Add the `Secure` attribute to the session cookie
    pub secure_cookie: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            secure_cookie: false,
        }
    }
}

/// Storage configuration
///
/// Relative paths are resolved against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for all persisted state
    pub data_dir: PathBuf,

    /// Exhibits document (object keyed by slug)
    pub exhibits_file: PathBuf,

    /// Directory holding uploaded artwork images and their derivatives
    pub uploads_dir: PathBuf,

    /// URL prefix under which uploads are served
    pub uploads_url: String,

    /// Title overrides keyed by artwork filename
    pub artwork_meta_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs_next::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".easel"),
            exhibits_file: PathBuf::from("exhibits.json"),
            uploads_dir: PathBuf::from("uploads"),
            uploads_url: "/uploads".to_string(),
            artwork_meta_file: PathBuf::from("artwork_meta.json"),
        }
    }
}

impl StorageConfig {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn exhibits_path(&self) -> PathBuf {
        self.resolve(&self.exhibits_file)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.resolve(&self.uploads_dir)
    }

    pub fn artwork_meta_path(&self) -> PathBuf {
        self.resolve(&self.artwork_meta_file)
    }
}

/// Artist authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Argon2 PHC string of the artist password (empty disables login).
    /// Generate with `easel hash-password`.
    #[serde(default)]
    pub password_hash: String,
}

/// Session lifetime configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are dropped
    pub idle_timeout_seconds: u64,

    /// How often the idle sweep runs
    pub sweep_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: 7200,
            sweep_interval_seconds: 300,
        }
    }
}

/// Rate limit for one key
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum attempts per window
    pub max: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

/// Per-session rate limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitsConfig {
    /// Login attempts
    pub login: RateLimitConfig,

    /// Mutating exhibit actions (create, update, delete, reorder)
    pub exhibit_writes: RateLimitConfig,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            login: RateLimitConfig {
                max: 5,
                window_seconds: 900,
            },
            exhibit_writes: RateLimitConfig {
                max: 120,
                window_seconds: 3600,
            },
        }
    }
}
