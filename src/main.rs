//! Easel - Portfolio backend for artists
//!
//! Serves the admin API for exhibits and uploaded artworks behind a single
//! artist login.

use anyhow::Result;
use clap::{Parser, Subcommand};
use easel::{
    api::build_app,
    artworks::{ArtworkLister, ArtworksState, FsArtworkSource},
    config::{EaselConfig, SessionConfig},
    exhibits::{ExhibitService, ExhibitsState},
    records::RecordStore,
    security::{password, AuthState, RateLimit},
    session::SessionStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "easel")]
#[command(author = "Easel Team")]
#[command(version)]
#[command(about = "Portfolio backend for artists")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "EASEL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check storage paths and authentication setup
    Doctor,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },

    /// Print a salted Argon2 hash to use as `auth.password_hash`
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("easel={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => EaselConfig::load(path)?,
        None => EaselConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            run_server(config, host, port).await?;
        }
        Commands::Doctor => {
            run_doctor(&config, cli.config.as_deref()).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
        Commands::HashPassword { password } => {
            println!("{}", password::hash_password(&password)?);
        }
    }

    Ok(())
}

async fn run_server(config: EaselConfig, host: String, port: u16) -> Result<()> {
    tracing::info!("Starting Easel");

    if config.auth.password_hash.trim().is_empty() {
        tracing::warn!("auth.password_hash is not set; login is disabled");
    } else if !password::is_valid_hash(&config.auth.password_hash) {
        tracing::warn!("auth.password_hash is not a valid Argon2 hash; login will fail");
    }

    let sessions = SessionStore::new();
    spawn_session_sweeper(sessions.clone(), config.session);
    let secure_cookie = config.server.secure_cookie;

    let auth_state = AuthState {
        sessions: sessions.clone(),
        auth: config.auth.clone(),
        login_limit: RateLimit::new("login", config.rate_limit.login),
        secure_cookie,
    };

    let source = Arc::new(FsArtworkSource::new(config.storage.uploads_path()));
    let lister = ArtworkLister::new(source, &config.storage.uploads_url)?
        .with_meta_file(config.storage.artwork_meta_path());
    let artworks_state = ArtworksState {
        sessions: sessions.clone(),
        lister: Arc::new(lister),
    };

    let exhibits_path = config.storage.exhibits_path();
    tracing::info!("Exhibits document: {}", exhibits_path.display());
    let exhibits_state = ExhibitsState {
        sessions,
        service: Arc::new(ExhibitService::new(exhibits_path)),
        write_limit: RateLimit::new("exhibit_writes", config.rate_limit.exhibit_writes),
    };

    let app = build_app(
        auth_state,
        artworks_state,
        exhibits_state,
        &config.server.cors_origins,
    );

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("Easel is listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

/// Periodically drop sessions that have been idle past the timeout
fn spawn_session_sweeper(sessions: SessionStore, config: SessionConfig) {
    let max_idle = i64::try_from(config.idle_timeout_seconds).unwrap_or(i64::MAX);
    let period = Duration::from_secs(config.sweep_interval_seconds.max(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            sessions.cleanup_idle(max_idle).await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

async fn run_doctor(config: &EaselConfig, config_path: Option<&std::path::Path>) -> Result<()> {
    println!("Easel Doctor");
    println!();

    println!("Checking configuration...");
    match config_path {
        Some(path) => println!("  ✓ Configuration file: {}", path.display()),
        None => println!("  ℹ No configuration file given (using defaults)"),
    }
    if config.auth.password_hash.trim().is_empty() {
        println!("  ✗ auth.password_hash is empty; login is disabled");
    } else if !password::is_valid_hash(&config.auth.password_hash) {
        println!("  ✗ auth.password_hash is not a valid Argon2 hash");
    } else {
        println!("  ✓ Artist password configured");
    }

    println!();
    println!("Checking storage...");
    let exhibits_path = config.storage.exhibits_path();
    let store = RecordStore::<easel::exhibits::types::Exhibit>::new(&exhibits_path);
    match store.load().await {
        Ok(doc) => println!(
            "  ✓ Exhibits document readable ({} exhibits): {}",
            doc.len(),
            exhibits_path.display()
        ),
        Err(e) => println!("  ✗ Exhibits document {}: {}", exhibits_path.display(), e),
    }

    let uploads = config.storage.uploads_path();
    if uploads.is_dir() {
        println!("  ✓ Uploads directory: {}", uploads.display());
    } else {
        println!("  ✗ Uploads directory missing: {}", uploads.display());
    }

    println!();
    println!("Doctor check complete!");

    Ok(())
}

fn show_config(config: Option<&EaselConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
