// crates/infohub-server/src/server.rs
// ============================================================================
// Module: Info Hub Server
// Description: Server construction from configuration and the serve loop.
// Purpose: Wire collaborators into the core and run the HTTP listener with
//          graceful shutdown.
// Dependencies: axum, infohub-*, tokio
// ============================================================================

//! ## Overview
//! [`InfoHubServer::from_config`] validates configuration, builds the event
//! sink and every collaborator, and seeds inline exports into the configured
//! store. [`InfoHubServer::serve`] listens until Ctrl-C, then lets in-flight
//! requests finish for at most `shutdown_timeout_ms`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use infohub_clients::CacheClient;
use infohub_clients::ClientCredentials;
use infohub_clients::JsonLdCredentialParser;
use infohub_clients::PolicyClient;
use infohub_clients::SignerClient;
use infohub_config::InfoHubConfig;
use infohub_config::ServerAuthMode;
use infohub_config::ServerConfig;
use infohub_core::ConfigurationStore;
use infohub_core::HubCollaborators;
use infohub_core::HubEventSink;
use infohub_core::InMemoryConfigurationStore;
use infohub_core::InfoHub;
use infohub_store_sqlite::SqliteExportStore;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::audit::build_event_sink;
use crate::auth::BearerAuth;
use crate::routes::AppState;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Info Hub HTTP server.
pub struct InfoHubServer {
    /// Server configuration.
    config: ServerConfig,
    /// Handler state.
    state: AppState,
}

impl InfoHubServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when validation or initialization fails.
    pub fn from_config(config: InfoHubConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let events = build_event_sink(&config.server.audit)
            .map_err(|err| ServerError::Init(format!("audit sink: {err}")))?;
        let deps = build_collaborators(&config, Arc::clone(&events))?;
        emit_open_auth_warning(&config.server);
        Ok(Self::new(config.server, InfoHub::new(deps), events))
    }

    /// Builds a server around an existing hub.
    #[must_use]
    pub fn new(config: ServerConfig, hub: InfoHub, events: Arc<dyn HubEventSink>) -> Self {
        let state = AppState::new(
            hub,
            events,
            BearerAuth::from_config(&config),
            Duration::from_millis(config.request_timeout_ms),
            config.max_body_bytes,
        );
        Self {
            config,
            state,
        }
    }

    /// Returns the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        crate::routes::router(self.state.clone())
    }

    /// Binds the configured address and serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr = self.config.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_with_shutdown(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Serves on `listener` until `shutdown` completes, then waits for
    /// in-flight requests up to the configured shutdown timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when serving fails or draining times out.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
        let (fired_tx, mut fired_rx) = watch::channel(false);
        let signal = async move {
            shutdown.await;
            let _ = fired_tx.send(true);
        };
        let server = axum::serve(listener, self.router()).with_graceful_shutdown(signal);
        let drain_deadline = async move {
            if fired_rx.wait_for(|fired| *fired).await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(grace).await;
        };
        tokio::select! {
            result = async move { server.await } => {
                result.map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
            }
            () = drain_deadline => {
                Err(ServerError::Transport("graceful shutdown timed out".to_string()))
            }
        }
    }
}

/// Builds the collaborators described by configuration.
///
/// # Errors
///
/// Returns [`ServerError`] when a client or the export store cannot be built.
pub fn build_collaborators(
    config: &InfoHubConfig,
    events: Arc<dyn HubEventSink>,
) -> Result<HubCollaborators, ServerError> {
    let store: Arc<dyn ConfigurationStore> = match config.export_store.sqlite() {
        Some(sqlite) => {
            let store = SqliteExportStore::new(&sqlite)
                .map_err(|err| ServerError::Init(format!("export store: {err}")))?;
            for export in &config.exports {
                store
                    .put(export)
                    .map_err(|err| ServerError::Init(format!("export store: {err}")))?;
            }
            Arc::new(store)
        }
        None => Arc::new(InMemoryConfigurationStore::with_exports(config.exports.iter().cloned())),
    };
    let mut evaluator = PolicyClient::new(&config.policy)
        .map_err(|err| ServerError::Init(format!("policy client: {err}")))?;
    let mut cache = CacheClient::new(&config.cache)
        .map_err(|err| ServerError::Init(format!("cache client: {err}")))?;
    let mut signer = SignerClient::new(&config.signer)
        .map_err(|err| ServerError::Init(format!("signer client: {err}")))?;
    if let Some(oauth) = &config.oauth {
        let source = ClientCredentials::new(oauth)
            .map_err(|err| ServerError::Init(format!("oauth: {err}")))?;
        evaluator = evaluator.with_token_source(source.clone());
        cache = cache.with_token_source(source.clone());
        signer = signer.with_token_source(source);
    }
    Ok(HubCollaborators {
        store,
        evaluator: Arc::new(evaluator),
        cache: Arc::new(cache),
        signer: Arc::new(signer),
        parser: Arc::new(JsonLdCredentialParser::new()),
        events,
    })
}

/// Warns when the server accepts unauthenticated requests.
fn emit_open_auth_warning(server: &ServerConfig) {
    if server.auth_mode() == ServerAuthMode::None {
        let _ = writeln!(
            std::io::stderr(),
            "infohub: WARNING: server running without inbound auth; configure server.auth to \
             enable bearer_token"
        );
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
