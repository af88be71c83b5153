//! HTTP surface: router and request handlers.
//!
//! Every handler performs a single document-store operation and
//! forwards the raw result. The two per-user endpoints additionally
//! require a verified token cookie and an owner check.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use visahub_common::{AppliedVisa, Database, Error, VisaListing, VisaListingUpdate};

use crate::auth::{self, CurrentUser, TOKEN_COOKIE};
use crate::config::ServerConfig;

/// The fixed page size of the latest-listings query.
const LATEST_LISTINGS_LIMIT: i64 = 6;

/// Shared per-process state, injected into handlers.
pub struct AppState {
    pub db: Database,
    pub cfg: ServerConfig,
    cors_origin: HeaderValue,
}

/// VisaHub API server
#[derive(Clone)]
pub struct AppServer {
    state: Arc<AppState>,
}

/// Construct the server and run it until shutdown.
pub async fn serve(addr: SocketAddr, cfg: ServerConfig) -> anyhow::Result<()> {
    let server = AppServer::new(cfg).await?;
    server.serve(addr).await
}

impl AppServer {
    /// Connect the store client and build the server state.
    pub async fn new(cfg: ServerConfig) -> anyhow::Result<Self> {
        let cors_origin: HeaderValue = cfg
            .allowed_origin
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid VISAHUB_ALLOWED_ORIGIN: {}", cfg.allowed_origin))?;

        let db = Database::connect(&cfg.mongodb_uri, &cfg.db_name).await?;

        Ok(Self {
            state: Arc::new(AppState {
                db,
                cfg,
                cors_origin,
            }),
        })
    }

    /// Create router
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(self.state.cors_origin.clone())
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([CONTENT_TYPE]);

        Router::new()
            .route("/", get(health_handler))
            // Auth
            .route("/jwt", post(issue_token_handler))
            // Listings
            .route("/visa", post(create_listing_handler).get(list_listings_handler))
            .route(
                "/visa/:id",
                get(get_listing_handler)
                    .put(update_listing_handler)
                    .delete(delete_listing_handler),
            )
            .route("/latest-added-visas", get(latest_listings_handler))
            // Per-user listings (token required)
            .route("/my-added-visas", get(my_added_visas_handler))
            // Applications
            .route(
                "/applied-visas",
                post(create_application_handler).get(list_applications_handler),
            )
            .route("/applied-visas/:id", delete(delete_application_handler))
            .fallback(not_found_handler)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the server; returns after a ctrl-c initiated shutdown.
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("VisaHub API listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Shutting down, releasing store client");
        self.state.db.clone().shutdown().await;

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "visahub-server"
    }))
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    email: String,
}

/// `POST /jwt` - sign a token for the supplied identity and set it into
/// an HTTP-only, non-secure cookie (plain HTTP is fine for local dev).
async fn issue_token_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<TokenRequest>,
) -> impl IntoResponse {
    if req.email.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "email required" })),
        )
            .into_response();
    }

    match auth::issue_token(&state.cfg.token_secret, &req.email) {
        Ok(token) => {
            let cookie = Cookie::build((TOKEN_COOKIE, token))
                .path("/")
                .http_only(true)
                .secure(false)
                .build();
            (jar.add(cookie), Json(serde_json::json!({ "success": true }))).into_response()
        }
        Err(e) => {
            error!("token signing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "token signing failed" })),
            )
                .into_response()
        }
    }
}

async fn create_listing_handler(
    State(state): State<Arc<AppState>>,
    Json(listing): Json<VisaListing>,
) -> impl IntoResponse {
    match state.db.insert_listing(&listing).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct ListingsQuery {
    filter: Option<String>,
}

async fn list_listings_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListingsQuery>,
) -> impl IntoResponse {
    let visa_type = q.filter.as_deref().filter(|f| !f.is_empty());
    match state.db.list_listings(visa_type).await {
        Ok(listings) => Json(listings).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_listing_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.db.get_listing(&id).await {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    email: String,
}

/// `GET /my-added-visas?email=` - listings owned by the caller.
async fn my_added_visas_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(q): Query<OwnerQuery>,
) -> impl IntoResponse {
    if !user.owns(&q.email) {
        return auth::forbidden();
    }
    match state.db.listings_by_owner(&q.email).await {
        Ok(listings) => Json(listings).into_response(),
        Err(e) => error_response(e),
    }
}

async fn latest_listings_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.db.latest_listings(LATEST_LISTINGS_LIMIT).await {
        Ok(listings) => Json(listings).into_response(),
        Err(e) => error_response(e),
    }
}

async fn update_listing_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<VisaListingUpdate>,
) -> impl IntoResponse {
    match state.db.update_listing(&id, &update).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_listing_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.db.delete_listing(&id).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => error_response(e),
    }
}

async fn create_application_handler(
    State(state): State<Arc<AppState>>,
    Json(application): Json<AppliedVisa>,
) -> impl IntoResponse {
    match state.db.insert_application(&application).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct ApplicationsQuery {
    email: String,
    search: Option<String>,
}

/// `GET /applied-visas?email=&search=` - the caller's applications,
/// optionally narrowed by a case-insensitive country-name substring.
async fn list_applications_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(q): Query<ApplicationsQuery>,
) -> impl IntoResponse {
    if !user.owns(&q.email) {
        return auth::forbidden();
    }
    let search = q.search.as_deref().filter(|s| !s.is_empty());
    match state.db.applications_by_email(&q.email, search).await {
        Ok(applications) => Json(applications).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_application_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.db.delete_application(&id).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => error_response(e),
    }
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}

fn error_response(err: Error) -> Response {
    match &err {
        Error::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "message": err.to_string() })),
        )
            .into_response(),
        Error::InvalidId(_) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response(),
        _ => {
            error!("request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
