//! HTTP server for lore.
//!
//! Maps the page URL shapes onto [`Navigator`] entry points and serves the
//! resulting page views as JSON:
//!
//! | Route                                   | Navigator call     |
//! |-----------------------------------------|--------------------|
//! | `GET /api/pages`                        | `default_view`     |
//! | `GET /api/pages/{discipline}`           | `discipline_view`  |
//! | `GET /api/pages/{discipline}/{language}`| `language_view`    |
//! | `GET /api/pages/{d}/{l}/{node}`         | `node_view`        |
//! | `GET /api/disciplines`                  | `disciplines`      |
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use lore_content::FsRepository;
//! use lore_server::{ServerConfig, run_server};
//! use lore_site::{HtmlRenderer, Navigator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let navigator = Navigator::new(
//!         Arc::new(FsRepository::new("content")),
//!         Arc::new(HtmlRenderer::new()),
//!     )
//!     .unwrap();
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 7979,
//!         version: "1.0.0".to_owned(),
//!     };
//!
//!     run_server(config, navigator).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use lore_site::Navigator;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Application version (mixed into `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            version: String::new(),
        }
    }
}

impl ServerConfig {
    /// Create server configuration from lore config.
    #[must_use]
    pub fn from_config(config: &lore_config::Config, version: String) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            version,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot bind.
pub async fn run_server(
    config: ServerConfig,
    navigator: Navigator,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        navigator: Arc::new(navigator),
        version: config.version,
    });
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
