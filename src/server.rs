//! JSON HTTP API over the content service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check (returns version) |
//! | `GET` | `/posts` | Published posts; `category`, `tag`, `author`, `q` filters |
//! | `GET` | `/posts/{slug}` | One post with its body |
//! | `GET` | `/posts/{slug}/related` | Related posts; optional `limit` |
//! | `GET` | `/categories` | Distinct categories |
//! | `GET` | `/tags` | Distinct tags |
//! | `GET` | `/authors` | All authors |
//! | `GET` | `/authors/{slug}` | One author |
//! | `GET` | `/authors/{slug}/posts` | Posts by one author |
//! | `GET` | `/sources` | Source status |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "not found: some-slug" } }
//! ```
//!
//! Error codes: `not_found` (404), `malformed_content` (404), `bad_request` (400).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::aggregate::ContentService;
use crate::config::Config;
use crate::error::ResolveError;
use crate::models::{Author, PostDetail, PostSummary};
use crate::query::PostFilter;
use crate::sources::{get_sources, SourceStatus};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    service: ContentService,
}

/// Build the router. Exposed so tests and embedding binaries can serve it
/// on their own listener.
pub fn router(service: ContentService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/posts", get(handle_list_posts))
        .route("/posts/{slug}", get(handle_get_post))
        .route("/posts/{slug}/related", get(handle_related))
        .route("/categories", get(handle_categories))
        .route("/tags", get(handle_tags))
        .route("/authors", get(handle_list_authors))
        .route("/authors/{slug}", get(handle_get_author))
        .route("/authors/{slug}/posts", get(handle_author_posts))
        .route("/sources", get(handle_sources))
        .layer(cors)
        .with_state(AppState { service })
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(config: &Config, service: ContentService) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("content API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

/// Both lookup failures are a 404 to clients; the code tells them apart.
impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        let code = match err {
            ResolveError::NotFound(_) => "not_found",
            ResolveError::Malformed { .. } => "malformed_content",
        };
        AppError {
            status: StatusCode::NOT_FOUND,
            code,
            message: err.to_string(),
        }
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct PostsQuery {
    category: Option<String>,
    tag: Option<String>,
    author: Option<String>,
    q: Option<String>,
}

async fn handle_list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostsQuery>,
) -> Json<Vec<PostSummary>> {
    let filter = PostFilter {
        category: params.category,
        tag: params.tag,
        author: params.author,
        query: params.q,
    };
    Json(state.service.filtered(&filter).await)
}

async fn handle_get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetail>, AppError> {
    Ok(Json(state.service.get_post(&slug).await?))
}

#[derive(Debug, Default, Deserialize)]
struct RelatedQuery {
    limit: Option<usize>,
}

async fn handle_related(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<RelatedQuery>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    if params.limit == Some(0) {
        return Err(bad_request("limit must be >= 1"));
    }
    let detail = state.service.get_post(&slug).await?;
    Ok(Json(
        state.service.related_to(&detail.summary, params.limit).await,
    ))
}

async fn handle_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.all_categories().await)
}

async fn handle_tags(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.all_tags().await)
}

async fn handle_list_authors(State(state): State<AppState>) -> Json<Vec<Author>> {
    Json(state.service.list_all_authors().await)
}

async fn handle_get_author(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(state.service.get_author(&slug).await?))
}

async fn handle_author_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    Ok(Json(state.service.posts_by_author_slug(&slug).await?))
}

async fn handle_sources(State(state): State<AppState>) -> Json<Vec<SourceStatus>> {
    Json(get_sources(&state.service).await)
}
