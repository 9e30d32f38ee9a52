//! HTTP server and client for parlbot.
//!
//! Serves the question endpoint used by the chat widget, and lets the CLI
//! act as a thin client against a running server.

pub mod client;
mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::llm::AnswerClient;
use crate::query::{load_extractor, Extractor};
use crate::storage::StatsStore;

/// Shared application state for HTTP handlers
pub struct AppState {
    pub root: PathBuf,
    pub config: Config,
    pub answerer: AnswerClient,
    /// Current lexicon; swapped wholesale on reload
    lexicon: RwLock<Arc<Extractor>>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config) -> Result<Self> {
        let answerer = AnswerClient::new(&config.llm).context("Failed to build LLM client")?;
        if !answerer.has_api_key() {
            tracing::warn!(
                "No API key for the answering model; answers will use the fallback message"
            );
        }
        let extractor = load_extractor(&config, &root);
        Ok(Self {
            root,
            config,
            answerer,
            lexicon: RwLock::new(Arc::new(extractor)),
        })
    }

    /// Snapshot of the current lexicon
    pub fn extractor(&self) -> Arc<Extractor> {
        match self.lexicon.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn open_store(&self) -> Result<StatsStore> {
        StatsStore::open(
            &self.config.members_db_path(&self.root),
            &self.config.parties_db_path(&self.root),
        )
    }

    /// Rebuild the lexicon from the current tables.
    ///
    /// Fails without touching the current lexicon if the databases can't be opened.
    pub fn reload(&self) -> Result<Arc<Extractor>> {
        let store = self.open_store()?;
        let fresh = Arc::new(Extractor::load(&store, &self.config.aliases));
        let mut guard = match self.lexicon.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::clone(&fresh);
        Ok(fresh)
    }
}

/// Run the HTTP server, on `port` or the configured one
pub async fn run_server(root: PathBuf, port: Option<u16>) -> Result<()> {
    let config_path = Config::config_path(&root);
    if !config_path.exists() {
        anyhow::bail!(
            "parlbot not initialized in {}. Run `parlbot init` first.",
            root.display()
        );
    }

    let config = Config::load(&config_path).context("Failed to load config")?;
    let port = port.unwrap_or(config.server.port);

    let state = Arc::new(AppState::new(root, config)?);
    let app = handlers::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("parlbot HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
