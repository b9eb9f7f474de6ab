//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the upstream handler as fallback
//! - Wire up middleware (interception, timeout, request ID, tracing)
//! - Mark requests received over TLS
//! - Serve on a plain or TLS listener with graceful shutdown

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Extension, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigStore, EdgeConfig};
use crate::http::request::{ServedOverTls, UuidRequestId, X_REQUEST_ID};
use crate::interception::{intercept, Interceptor};
use crate::redirection::Transport;

/// How long in-flight TLS connections may drain after shutdown is requested.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into the upstream handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server hosting the site behind the redirection edge.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server from the current configuration.
    pub fn new(store: Arc<ConfigStore>, transport: Arc<dyn Transport>) -> Self {
        let config = store.snapshot();

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(config.timeouts.connect_ms)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let interceptor = Arc::new(Interceptor::new(store.clone(), transport));
        let state = AppState { store, client };

        let router = Self::build_router(&config, state, interceptor);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The request timeout sits inside interception so a timed-out upstream
    /// is still reported by the logging phase.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState, interceptor: Arc<Interceptor>) -> Router {
        let site = Router::new()
            .fallback(upstream_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        let router = intercept(site, interceptor)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId));

        if config.listener.tls.is_some() {
            router.layer(Extension(ServedOverTls))
        } else {
            router
        }
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on a plain TCP listener until shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS until shutdown is signalled.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Forwards requests that were not answered by a rule to the upstream.
async fn upstream_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let upstream = state.store.snapshot().upstream.address.clone();
    let (mut parts, body) = request.into_parts();

    let authority = match Authority::from_str(&upstream) {
        Ok(authority) => authority,
        Err(e) => {
            tracing::error!(upstream = %upstream, error = %e, "Invalid upstream address");
            return (StatusCode::BAD_GATEWAY, "Invalid upstream").into_response();
        }
    };

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(axum::http::uri::Scheme::HTTP);
    uri_parts.authority = Some(authority);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Invalid upstream URI").into_response();
        }
    };

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %upstream, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
