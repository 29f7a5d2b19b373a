/*!
 * HTTP surface of the service.
 *
 * `GET /api/health`, `GET /api/languages` and `POST /api/translate`, with
 * CORS limited to the configured origins.
 */

use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::app_config::ServerConfig;
use crate::app_controller::Controller;

pub mod error;
pub mod routes;

pub use self::error::ApiError;

/// State shared by every handler
#[derive(Clone)]
pub struct ServerState {
    pub controller: Arc<Controller>,
    pub request_timeout: Option<Duration>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router
pub fn create_router(controller: Arc<Controller>, config: &ServerConfig) -> Router {
    let state = ServerState {
        controller,
        request_timeout: config.request_timeout_secs.map(Duration::from_secs),
    };

    routes::create_routes()
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(controller: Arc<Controller>, config: &ServerConfig) -> Result<()> {
    let app = create_router(controller, config);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;
    Ok(())
}
