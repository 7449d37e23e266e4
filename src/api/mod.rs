mod admin;
mod feed;
mod notifications;
mod posts;
mod profiles;
mod search;

use crate::admin::AdminService;
use crate::auth::{AdminPolicy, Identity, IdentityProvider, RoleAdminPolicy, SqliteIdentityProvider};
use crate::config::SocialConnectConfig;
use crate::database::Database;
use crate::feed::FeedService;
use crate::interactions::InteractionService;
use crate::notifications::NotificationService;
use crate::profiles::ProfileService;
use anyhow::Result;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: SocialConnectConfig,
    pub database: Database,
    pub identity: Arc<dyn IdentityProvider>,
    pub admin_policy: Arc<dyn AdminPolicy>,
}

impl AppState {
    pub(crate) fn profiles(&self) -> ProfileService {
        ProfileService::new(self.database.clone())
    }

    pub(crate) fn feed(&self) -> FeedService {
        FeedService::new(self.database.clone())
    }

    pub(crate) fn interactions(&self) -> InteractionService {
        InteractionService::new(self.database.clone())
    }

    pub(crate) fn notifications(&self) -> NotificationService {
        NotificationService::new(self.database.clone())
    }

    pub(crate) fn admin(&self) -> AdminService {
        AdminService::new(self.database.clone())
    }
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse { message: msg }),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse { message: msg })
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse { message: msg }),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse { message: msg }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the caller's identity or fails with 401.
pub(crate) fn require_viewer(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;
    state
        .identity
        .current_user(token)?
        .ok_or_else(|| ApiError::Unauthorized("invalid or expired session token".into()))
}

/// Resolves the caller's identity when a token is present; anonymous callers
/// get `None` instead of an error.
pub(crate) fn optional_viewer(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Identity>, ApiError> {
    match bearer_token(headers) {
        Some(token) => Ok(state.identity.current_user(token)?),
        None => Ok(None),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/profiles", post(profiles::create_profile))
        .route("/profiles/me", put(profiles::update_own_profile))
        .route("/profiles/:id", get(profiles::get_profile))
        .route("/profiles/:id/posts", get(profiles::list_profile_posts))
        .route("/profiles/:id/follow", post(profiles::toggle_follow))
        .route("/feed", get(feed::get_feed))
        .route("/posts", post(posts::create_post))
        .route("/posts/:id", get(posts::get_post).delete(posts::delete_post))
        .route("/posts/:id/like", post(posts::toggle_like))
        .route(
            "/posts/:id/comments",
            get(posts::list_comments).post(posts::create_comment),
        )
        .route("/comments/:id", delete(posts::delete_comment))
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/unread_count",
            get(notifications::unread_count),
        )
        .route("/search", get(search::search_handler))
        .route("/admin/stats", get(admin::get_stats))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Tries to bind to the given port, or finds the next available port
async fn find_available_port(start_port: u16) -> Result<(TcpListener, u16)> {
    const MAX_PORT_ATTEMPTS: u16 = 100;

    for offset in 0..MAX_PORT_ATTEMPTS {
        let port = start_port + offset;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok((listener, port)),
            Err(e) => {
                if offset == 0 {
                    tracing::debug!(port, error = %e, "Port in use, trying next port");
                }
                continue;
            }
        }
    }

    anyhow::bail!(
        "Could not find available port in range {}-{}",
        start_port,
        start_port + MAX_PORT_ATTEMPTS - 1
    )
}

pub async fn serve_http(config: SocialConnectConfig, database: Database) -> Result<()> {
    let state = AppState {
        identity: Arc::new(SqliteIdentityProvider::new(database.clone())),
        admin_policy: Arc::new(RoleAdminPolicy::new(database.clone())),
        config: config.clone(),
        database,
    };
    let router = build_router(state);

    let (listener, actual_port) = find_available_port(config.api_port).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], actual_port));

    if actual_port != config.api_port {
        tracing::warn!(
            requested_port = config.api_port,
            actual_port = actual_port,
            "Configured port was in use, bound to next available port"
        );
    }

    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
