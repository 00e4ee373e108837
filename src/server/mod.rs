pub mod error;
pub mod routes;
pub mod shutdown;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::pipeline::NavigationPipeline;
use crate::server::routes::{build_router, AppState};
use crate::server::shutdown::ShutdownManager;
use crate::state::SessionKeyStore;

pub use error::ErrorResponse;
pub use routes::SESSION_COOKIE;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

pub struct NavigationServer {
    pub addr: SocketAddr,
    /// The bound listener, populated by try_bind(), consumed by run().
    listener: Option<TcpListener>,
    pipeline: Arc<NavigationPipeline>,
    context_path: String,
    shutdown: Arc<ShutdownManager>,
}

impl NavigationServer {
    pub fn new(config: &Config) -> Self {
        let keys = Arc::new(SessionKeyStore::with_limits(
            config.view_state.max_sessions,
            Duration::from_secs(config.view_state.idle_timeout_secs),
        ));
        let pipeline = Arc::new(NavigationPipeline::from_config(config, keys));
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)), // Will be determined at bind time
            listener: None,
            pipeline,
            context_path: config.server.context_path.clone(),
            shutdown: Arc::new(ShutdownManager::new()),
        }
    }

    /// Bind to `bind_addr` and keep the listener until `run()`.
    pub async fn try_bind(&mut self, bind_addr: &str) -> Result<SocketAddr, BoxError> {
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;
        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        self.addr = actual_addr;
        self.listener = Some(listener);
        tracing::info!("Server bound to {}", actual_addr);
        Ok(actual_addr)
    }

    pub fn pipeline(&self) -> Arc<NavigationPipeline> {
        self.pipeline.clone()
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Run the server until shutdown.
    ///
    /// Consumes self to take ownership of the pre-bound listener.
    /// Call try_bind() before run().
    pub async fn run(self) -> Result<(), BoxError> {
        let listener = self
            .listener
            .ok_or("try_bind() must be called before run()")?;

        tracing::info!("Starting server on {}", self.addr);

        let app = build_router(AppState::new(self.pipeline.clone(), self.context_path));
        let sweeper = spawn_key_sweeper(self.pipeline.clone());

        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(e) = shutdown.wait_for_shutdown().await {
                    tracing::warn!("Failed to install signal handler: {}", e);
                }
            })
            .into_future()
            .await?;
        sweeper.abort();

        tracing::info!(
            in_flight = self.pipeline.active_requests().len(),
            "Server stopped"
        );
        Ok(())
    }
}

/// Periodically drop idle session keys so abandoned sessions do not linger
/// until the store fills up.
fn spawn_key_sweeper(pipeline: Arc<NavigationPipeline>) -> tokio::task::JoinHandle<()> {
    let keys = pipeline.view_state().keys().clone();
    let period = keys.idle_timeout().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = keys.purge_idle();
            if purged > 0 {
                tracing::debug!(purged, remaining = keys.len(), "Purged idle session keys");
            }
        }
    })
}

#[derive(Clone)]
pub struct ServerHandle {
    shutdown: Arc<ShutdownManager>,
}

impl ServerHandle {
    pub fn shutdown(&self) {
        self.shutdown.signal_shutdown();
    }
}
