//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (timeout, body limit, request id, tracing, metrics)
//! - Bind plain TCP or TLS and serve until shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::chain::ChainProfile;
use crate::config::{LimitsConfig, ListenerConfig, TlsConfig};
use crate::http::handlers::{self, keys, tx};
use crate::keys::KeyRegistry;
use crate::lifecycle::Shutdown;
use crate::node::{FeeOracle, NodeQuery};
use crate::observability::metrics;
use crate::tx::{SigningEngine, TxAssembler};

/// How long in-flight TLS connections may drain after shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: KeyRegistry,
    pub signer: SigningEngine,
    pub assembler: TxAssembler,
    pub node: Arc<dyn NodeQuery>,
}

impl AppState {
    pub fn new(registry: KeyRegistry, node: Arc<dyn NodeQuery>, profile: Arc<ChainProfile>) -> Self {
        let signer = SigningEngine::new(registry.clone(), profile.sign_mode);
        let assembler = TxAssembler::new(FeeOracle::new(node.clone()), profile);
        Self {
            registry,
            signer,
            assembler,
            node,
        }
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    metrics::record_request(&route, response.status().as_u16(), start.elapsed());
    response
}

/// Build the router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, limits: &LimitsConfig) -> Router {
    Router::new()
        .route("/version", get(handlers::version))
        .route("/keys", get(keys::list_keys).post(keys::create_key))
        .route(
            "/keys/{name}",
            get(keys::get_key).put(keys::update_key).delete(keys::delete_key),
        )
        .route("/tx/sign", post(tx::sign))
        .route("/tx/bank/send", post(tx::bank_send))
        .route("/tx/encode", post(tx::encode))
        .route("/tx/hash", post(tx::hash))
        .route("/tx/decode", post(tx::decode))
        .route("/tx/broadcast", post(tx::broadcast_tx))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(limits.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(limits.request_timeout_secs)))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, std::io::Error> {
    for path in [&tls.cert_path, &tls.key_path] {
        if !Path::new(path).exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("TLS file not found: {path}"),
            ));
        }
    }
    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await
}

/// HTTP server for the key API.
pub struct HttpServer {
    router: Router,
    listener: ListenerConfig,
}

impl HttpServer {
    pub fn new(state: AppState, listener: ListenerConfig, limits: &LimitsConfig) -> Self {
        Self {
            router: build_router(state, limits),
            listener,
        }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.listener.bind_address.parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {}: {e}", self.listener.bind_address),
            )
        })?;
        let mut stop = shutdown.subscribe();

        match &self.listener.tls {
            Some(tls) => {
                let config = load_tls_config(tls).await?;
                let handle = axum_server::Handle::new();
                let drain = handle.clone();
                tokio::spawn(async move {
                    let _ = stop.recv().await;
                    drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
                });

                tracing::info!(address = %addr, "HTTPS server starting");
                axum_server::bind_rustls(addr, config)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            None => {
                let listener = TcpListener::bind(addr).await?;
                tracing::info!(address = %listener.local_addr()?, "HTTP server starting");
                axum::serve(listener, self.router)
                    .with_graceful_shutdown(async move {
                        let _ = stop.recv().await;
                    })
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
