//! REST API server for explorerd
//!
//! Routes every request to one of the capability backends, or to the search,
//! batch and admission logic composed on top of them. All routes sit behind
//! HTTP Basic authentication.

mod auth;
mod handlers;
pub mod types;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Request,
    },
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use crate::backend::{ChainManager, Explorer, Syncer, TransactionPool};
use crate::config::HttpConfig;
use crate::error::{ExplorerError, Failure};

pub use auth::BasicAuth;
pub use types::{ErrorResponse, PeerResponse, TransactionsQuery};

/// The backends the API serves from. Cloning is cheap; all fields are
/// shared handles.
#[derive(Clone)]
pub struct Server {
    pub chain: Arc<dyn ChainManager>,
    pub syncer: Arc<dyn Syncer>,
    pub pool: Arc<dyn TransactionPool>,
    pub explorer: Arc<dyn Explorer>,
}

impl Server {
    pub fn new(
        chain: Arc<dyn ChainManager>,
        syncer: Arc<dyn Syncer>,
        pool: Arc<dyn TransactionPool>,
        explorer: Arc<dyn Explorer>,
    ) -> Self {
        Self {
            chain,
            syncer,
            pool,
            explorer,
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    /// A path parameter, query string or body could not be decoded.
    InvalidInput(String),
    /// An extractor rejected the request before the handler ran.
    Rejected(StatusCode, String),
    /// A backend call failed.
    Backend(Failure),
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
            ApiError::Backend(failure) => match failure.source {
                ExplorerError::NotFound(_) => StatusCode::NOT_FOUND,
                ExplorerError::InvalidTransaction(_) | ExplorerError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                ExplorerError::NetworkError(_) => StatusCode::BAD_GATEWAY,
                ExplorerError::StorageError(_) | ExplorerError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::InvalidInput(msg) | ApiError::Rejected(_, msg) => msg,
            ApiError::Backend(failure) => failure.to_string(),
            ApiError::Unauthorized => "unauthorized".to_string(),
        };

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"explorerd\""),
            );
        }
        response
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        ApiError::Backend(failure)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = format!("failed to decode request body: {}", rejection.body_text());
        match &rejection {
            // oversized or unreadable bodies keep their own status (413)
            JsonRejection::BytesRejection(_) => ApiError::Rejected(rejection.status(), message),
            _ => ApiError::InvalidInput(message),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(format!(
            "failed to decode query: {}",
            rejection.body_text()
        ))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router(server: Arc<Server>, http: &HttpConfig) -> Router {
    let credentials = BasicAuth::new(&http.password);

    Router::new()
        // Transaction pool
        .route("/txpool/transactions", get(handlers::txpool_transactions))
        .route("/txpool/broadcast", post(handlers::txpool_broadcast))
        // Syncer
        .route("/syncer/peers", get(handlers::syncer_peers))
        .route("/syncer/connect", post(handlers::syncer_connect))
        // Elements
        .route("/explorer/element/search/:id", get(handlers::element_search))
        .route("/explorer/element/siacoin/:id", get(handlers::element_siacoin))
        .route("/explorer/element/siafund/:id", get(handlers::element_siafund))
        .route("/explorer/element/contract/:id", get(handlers::element_contract))
        // Chain
        .route("/explorer/chain/:index", get(handlers::chain_stats))
        .route("/explorer/chain/:index/state", get(handlers::chain_state))
        .route("/explorer/transaction/:id", get(handlers::transaction))
        // Addresses
        .route(
            "/explorer/address/:address/balance",
            get(handlers::address_balance),
        )
        .route(
            "/explorer/address/:address/siacoins",
            get(handlers::address_siacoins),
        )
        .route(
            "/explorer/address/:address/siafunds",
            get(handlers::address_siafunds),
        )
        .route(
            "/explorer/address/:address/transactions",
            get(handlers::address_transactions),
        )
        // Batch queries
        .route(
            "/explorer/batch/addresses/balance",
            post(handlers::batch_balance),
        )
        .route(
            "/explorer/batch/addresses/siacoins",
            post(handlers::batch_siacoins),
        )
        .route(
            "/explorer/batch/addresses/siafunds",
            post(handlers::batch_siafunds),
        )
        .route(
            "/explorer/batch/addresses/transactions",
            post(handlers::batch_transactions),
        )
        // auth runs before any handler; logging wraps everything so
        // rejected requests are recorded too
        .layer(middleware::from_fn_with_state(credentials, auth::basic_auth))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(http.max_body_bytes))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(server)
}

/// Serve the API on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    server: Arc<Server>,
    http: &HttpConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_api_router(server, http);
    info!(addr = %listener.local_addr()?, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Bind `http.address` and serve the API until `shutdown` resolves.
pub async fn run_api_server(
    server: Arc<Server>,
    http: &HttpConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(&http.address).await?;
    serve(listener, server, http, shutdown).await
}
