//! HTTP control surface for the recorder supervisor.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::usecases::{
    AddSourceUseCase, ListRecordingsUseCase, ListTasksUseCase, OverviewUseCase, ProcessSupervisor,
};

mod error;
mod handlers;

pub use error::ApiServerError;

const DEFAULT_API_LISTEN: &str = "127.0.0.1:8000";
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(200);
const API_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ApiConfig {
    listen: String,
    allow_remote: bool,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let allow_remote = env_bool("STREAMGUARD_API_ALLOW_REMOTE").unwrap_or(false);
        let listen = std::env::var("STREAMGUARD_LISTEN")
            .ok()
            .and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .or_else(|| listen_from_port(allow_remote))
            .unwrap_or_else(|| DEFAULT_API_LISTEN.to_string());
        Self {
            listen,
            allow_remote,
        }
    }

    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.listen = listen.into();
        self
    }

    pub fn with_allow_remote(mut self, allow_remote: bool) -> Self {
        self.allow_remote = allow_remote;
        self
    }

    pub fn listen(&self) -> &str {
        &self.listen
    }
}

/// Everything the handlers need, shared behind an `Arc`.
pub struct ApiState {
    pub supervisor: Arc<ProcessSupervisor>,
    pub overview: Arc<dyn OverviewUseCase>,
    pub list_tasks: Arc<dyn ListTasksUseCase>,
    pub add_source: Arc<dyn AddSourceUseCase>,
    pub recordings: Arc<dyn ListRecordingsUseCase>,
    pub download_dir: PathBuf,
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let videos = ServeDir::new(&state.download_dir);

    Router::new()
        .route("/api/status", get(handlers::status))
        .route("/api/recorder/start", post(handlers::start_recorder))
        .route("/api/recorder/stop", post(handlers::stop_recorder))
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::add_task))
        .route("/api/recordings", get(handlers::list_recordings))
        .nest_service("/videos", videos)
        .layer(cors)
        .with_state(state)
}

/// Serve until `shutdown` flips to true, then drain in-flight requests.
pub async fn serve(
    state: Arc<ApiState>,
    config: &ApiConfig,
    shutdown: Arc<AtomicBool>,
) -> Result<(), ApiServerError> {
    let (listener, local_addr) = bind_listener(config)?;
    let listener = TcpListener::from_std(listener).map_err(|e| ApiServerError::Io {
        operation: "create async listener",
        source: e,
    })?;
    info!(listen = %local_addr, "API server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let shutdown_task = tokio::spawn(async move {
        while !shutdown.load(Ordering::Relaxed) {
            tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
        }
        let _ = shutdown_tx.send(true);
    });

    let mut server_rx = shutdown_rx.clone();
    let server = axum::serve(listener, build_router(state)).with_graceful_shutdown(async move {
        let _ = server_rx.changed().await;
    });
    let mut server_task = tokio::spawn(async move { server.await });

    let result = tokio::select! {
        joined = &mut server_task => joined,
        _ = shutdown_rx.changed() => {
            match tokio::time::timeout(API_SHUTDOWN_TIMEOUT, &mut server_task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        timeout_ms = API_SHUTDOWN_TIMEOUT.as_millis(),
                        "API server shutdown timed out; aborting"
                    );
                    server_task.abort();
                    Ok(Ok(()))
                }
            }
        }
    };
    shutdown_task.abort();
    info!(listen = %local_addr, "API server stopped");

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(ApiServerError::Io {
            operation: "serve",
            source: err,
        }),
        Err(err) => {
            error!(error = %err, "API server task failed");
            Ok(())
        }
    }
}

fn bind_listener(
    config: &ApiConfig,
) -> Result<(std::net::TcpListener, SocketAddr), ApiServerError> {
    let mut addrs = config
        .listen
        .to_socket_addrs()
        .map_err(|e| ApiServerError::InvalidListen {
            message: e.to_string(),
        })?;
    let addr = addrs.next().ok_or_else(|| ApiServerError::InvalidListen {
        message: "no resolved address".to_string(),
    })?;

    if !config.allow_remote && !addr.ip().is_loopback() {
        return Err(ApiServerError::InvalidListen {
            message: "refusing to bind non-loopback address without STREAMGUARD_API_ALLOW_REMOTE=1"
                .to_string(),
        });
    }

    let listener = std::net::TcpListener::bind(addr).map_err(|e| ApiServerError::Io {
        operation: "bind",
        source: e,
    })?;
    listener
        .set_nonblocking(true)
        .map_err(|e| ApiServerError::Io {
            operation: "set non-blocking",
            source: e,
        })?;
    let local_addr = listener.local_addr().map_err(|e| ApiServerError::Io {
        operation: "read local address",
        source: e,
    })?;
    Ok((listener, local_addr))
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|value| match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn listen_from_port(allow_remote: bool) -> Option<String> {
    let value = std::env::var("PORT").ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<u16>() {
        Ok(port) => {
            let host = if allow_remote { "0.0.0.0" } else { "127.0.0.1" };
            Some(format!("{host}:{port}"))
        }
        Err(_) => {
            warn!(value = %trimmed, "Invalid PORT; using default listen address");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EnvGuard, env_lock};

    #[test]
    fn test_api_config_default() {
        let _env_lock = env_lock();
        let _listen = EnvGuard::remove("STREAMGUARD_LISTEN");
        let _port = EnvGuard::remove("PORT");
        let config = ApiConfig::from_env();
        assert_eq!(config.listen(), DEFAULT_API_LISTEN);
    }

    #[test]
    fn test_api_config_port_fallback() {
        let _env_lock = env_lock();
        let _listen = EnvGuard::remove("STREAMGUARD_LISTEN");
        let _port = EnvGuard::set("PORT", "5555");
        let _allow = EnvGuard::remove("STREAMGUARD_API_ALLOW_REMOTE");
        let config = ApiConfig::from_env();
        assert_eq!(config.listen(), "127.0.0.1:5555");
    }

    #[test]
    fn test_api_config_remote_port_binds_all_interfaces() {
        let _env_lock = env_lock();
        let _listen = EnvGuard::remove("STREAMGUARD_LISTEN");
        let _port = EnvGuard::set("PORT", "5555");
        let _allow = EnvGuard::set("STREAMGUARD_API_ALLOW_REMOTE", "yes");
        let config = ApiConfig::from_env();
        assert_eq!(config.listen(), "0.0.0.0:5555");
    }

    #[test]
    fn test_api_config_listen_precedence() {
        let _env_lock = env_lock();
        let _listen = EnvGuard::set("STREAMGUARD_LISTEN", "127.0.0.1:9999");
        let _port = EnvGuard::set("PORT", "5555");
        let config = ApiConfig::from_env();
        assert_eq!(config.listen(), "127.0.0.1:9999");
    }

    #[test]
    fn test_invalid_port_uses_default() {
        let _env_lock = env_lock();
        let _listen = EnvGuard::remove("STREAMGUARD_LISTEN");
        let _port = EnvGuard::set("PORT", "eighty");
        let config = ApiConfig::from_env();
        assert_eq!(config.listen(), DEFAULT_API_LISTEN);
    }

    #[test]
    fn test_bind_refuses_remote_without_opt_in() {
        let _env_lock = env_lock();
        let config = ApiConfig::from_env()
            .with_listen("0.0.0.0:0")
            .with_allow_remote(false);
        assert!(matches!(
            bind_listener(&config),
            Err(ApiServerError::InvalidListen { .. })
        ));
    }

    #[test]
    fn test_bind_ephemeral_loopback() {
        let _env_lock = env_lock();
        let config = ApiConfig::from_env().with_listen("127.0.0.1:0");
        let (_listener, addr) = bind_listener(&config).unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }
}
