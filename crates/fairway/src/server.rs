//! `GatewayServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session state
//! machine. One handler task per accepted connection; the shared state
//! (repository, session registry, codec, config) travels in an `Arc`.

use std::sync::Arc;
use std::time::Duration;

use fairway_game::GameManager;
use fairway_protocol::JsonCodec;
use fairway_store::Store;
use fairway_transport::WebSocketTransport;

use crate::GatewayError;
use crate::handler::handle_connection;

/// Timer settings for session cleanup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Delay between broadcasting a cancellation (host left a waiting
    /// session) and removing the session, so clients receive the
    /// notice.
    pub cancel_grace: Duration,

    /// How long an abandoned session may sit with zero connected
    /// players before it is removed from memory. Reconnection before
    /// the timer fires cancels the removal.
    pub cleanup_grace: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cancel_grace: Duration::from_secs(5),
            cleanup_grace: Duration::from_secs(300),
        }
    }
}

/// Shared server state handed to each connection handler.
pub(crate) struct ServerState<S: Store> {
    pub(crate) store: Arc<S>,
    pub(crate) games: GameManager<S>,
    pub(crate) codec: JsonCodec,
    pub(crate) config: GatewayConfig,
}

/// Builder for configuring and starting a gateway server.
///
/// # Example
///
/// ```rust,ignore
/// let server = GatewayServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(store)
///     .await?;
/// server.run().await
/// ```
pub struct GatewayServerBuilder {
    bind_addr: String,
    config: GatewayConfig,
}

impl GatewayServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: GatewayConfig::default(),
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the cleanup timers (tests shrink them).
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and assembles the server around the given
    /// repository.
    pub async fn build<S: Store>(self, store: Arc<S>) -> Result<GatewayServer<S>, GatewayError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState {
            games: GameManager::new(Arc::clone(&store)),
            store,
            codec: JsonCodec,
            config: self.config,
        });
        Ok(GatewayServer { transport, state })
    }
}

impl Default for GatewayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running gateway server.
pub struct GatewayServer<S: Store> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S>>,
}

impl<S: Store> GatewayServer<S> {
    pub fn builder() -> GatewayServerBuilder {
        GatewayServerBuilder::new()
    }

    /// The bound listen address.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process terminates.
    pub async fn run(mut self) -> Result<(), GatewayError> {
        tracing::info!("fairway gateway running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
