//! HTTP server with incremental page regeneration

pub mod preview;

use anyhow::{anyhow, Result};
use axum::{
    body::Body,
    extract::{FromRef, Path, Query, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{Lookup, PageCache};
use crate::cms::CmsError;
use crate::config::{FallbackMode, SiteConfig};
use crate::generator::{post_route, Generator, HOME_ROUTE};
use crate::Blog;

use preview::read_preview;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<ServerState>,
}

struct ServerState {
    generator: Generator,
    cache: PageCache,
    key: Key,
    static_dir: PathBuf,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.key.clone()
    }
}

impl AppState {
    pub fn new(config: &SiteConfig, static_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(ServerState {
                generator: Generator::new(config)?,
                cache: PageCache::new(),
                key: cookie_key(&config.preview.cookie_secret)?,
                static_dir,
            }),
        })
    }

    pub fn generator(&self) -> &Generator {
        &self.inner.generator
    }

    pub fn cache(&self) -> &PageCache {
        &self.inner.cache
    }

    fn config(&self) -> &SiteConfig {
        self.inner.generator.config()
    }

    fn listing_max_age(&self) -> Duration {
        Duration::from_secs(self.config().listing.revalidate)
    }

    fn post_max_age(&self) -> Duration {
        Duration::from_secs(self.config().post.revalidate)
    }

    /// Render the listing and the prebuilt posts into the cache
    pub async fn prewarm(&self) -> Result<usize> {
        let home = self.generator().home(None).await?;
        self.cache().store(HOME_ROUTE, home, Instant::now());
        let mut warmed = 1;

        for slug in self.generator().prebuilt_slugs().await? {
            if let Some(html) = self.generator().post(&slug, None).await? {
                self.cache().store(&post_route(&slug), html, Instant::now());
                warmed += 1;
            }
        }
        Ok(warmed)
    }

    fn not_found(&self) -> Response {
        match self.generator().render_not_found() {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render not found page: {}", e);
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
        }
    }
}

/// Signing key for the preview cookie
fn cookie_key(secret: &str) -> Result<Key> {
    if secret.is_empty() {
        tracing::warn!("preview.cookie_secret is not set, preview sessions end on restart");
        return Ok(Key::generate());
    }
    Key::try_from(secret.as_bytes())
        .map_err(|e| anyhow!("invalid preview.cookie_secret (needs at least 64 bytes): {}", e))
}

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("Failed to render page: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(more_posts_handler))
        .route("/api/preview", get(preview::enter))
        .route("/api/exit-preview", get(preview::exit))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let state = AppState::new(&blog.config, blog.static_dir.clone())?;

    match state.prewarm().await {
        Ok(count) => tracing::info!("Prebuilt {} pages", count),
        Err(e) => tracing::warn!("Prebuild failed, pages will render on demand: {:#}", e),
    }

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /
async fn home_handler(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    if let Some(preview) = read_preview(&jar) {
        return match state.generator().home(Some(&preview)).await {
            Ok(html) => Html(html).into_response(),
            Err(e) => server_error(e),
        };
    }

    let now = Instant::now();
    match state.cache().lookup(HOME_ROUTE, state.listing_max_age(), now) {
        Lookup::Fresh(html) => Html(html).into_response(),
        Lookup::Stale(stale) => match state.generator().home(None).await {
            Ok(html) => {
                state.cache().store(HOME_ROUTE, html.clone(), Instant::now());
                Html(html).into_response()
            }
            Err(e) => {
                tracing::warn!("Regenerating {} failed, serving stale page: {:#}", HOME_ROUTE, e);
                Html(stale).into_response()
            }
        },
        Lookup::Missing => match state.generator().home(None).await {
            Ok(html) => {
                state.cache().store(HOME_ROUTE, html.clone(), Instant::now());
                Html(html).into_response()
            }
            Err(e) => server_error(e),
        },
    }
}

/// GET /post/:slug
async fn post_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(slug): Path<String>,
) -> Response {
    if let Some(preview) = read_preview(&jar) {
        return match state.generator().post(&slug, Some(&preview)).await {
            Ok(Some(html)) => Html(html).into_response(),
            Ok(None) => state.not_found(),
            Err(e) => server_error(e),
        };
    }

    let route = post_route(&slug);
    let max_age = state.post_max_age();
    let now = Instant::now();

    match state.cache().lookup(&route, max_age, now) {
        Lookup::Fresh(html) => Html(html).into_response(),
        Lookup::Stale(stale) => match state.generator().post(&slug, None).await {
            Ok(Some(html)) => {
                state.cache().store(&route, html.clone(), Instant::now());
                Html(html).into_response()
            }
            Ok(None) => {
                tracing::info!("{} was removed", route);
                state.cache().mark_not_found(&route, Instant::now());
                state.not_found()
            }
            Err(e) => {
                tracing::warn!("Regenerating {} failed, serving stale page: {:#}", route, e);
                Html(stale).into_response()
            }
        },
        Lookup::Missing => match state.config().post.fallback {
            FallbackMode::Blocking => generate_post(&state, &slug, &route).await,
            FallbackMode::Loading if state.cache().is_not_found(&route, now) => state.not_found(),
            FallbackMode::Loading => {
                if state.cache().begin_pending(&route) {
                    let state = state.clone();
                    tokio::spawn(async move {
                        generate_post(&state, &slug, &route).await;
                    });
                }
                loading_page(&state)
            }
        },
    }
}

/// Generate a post into the cache and answer with it
async fn generate_post(state: &AppState, slug: &str, route: &str) -> Response {
    match state.generator().post(slug, None).await {
        Ok(Some(html)) => {
            tracing::debug!("Generated {} on demand", route);
            state.cache().store(route, html.clone(), Instant::now());
            Html(html).into_response()
        }
        Ok(None) => {
            state.cache().mark_not_found(route, Instant::now());
            state.not_found()
        }
        Err(e) => {
            state.cache().abandon_pending(route);
            server_error(e)
        }
    }
}

fn loading_page(state: &AppState) -> Response {
    match state.generator().render_loading() {
        Ok(html) => (
            [("refresh", "1"), ("cache-control", "no-store")],
            Html(html),
        )
            .into_response(),
        Err(e) => server_error(e),
    }
}

#[derive(Debug, Deserialize)]
struct MorePostsParams {
    cursor: Option<String>,
}

/// GET /api/posts?cursor=
async fn more_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<MorePostsParams>,
) -> Response {
    let Some(cursor) = params.cursor.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Missing cursor" })),
        )
            .into_response();
    };

    match state.generator().more_posts(&cursor).await {
        Ok(page) => Json(page).into_response(),
        Err(CmsError::ForeignCursor(url)) => {
            tracing::warn!("Refusing foreign cursor {}", url);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Invalid cursor" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Loading more posts failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": "Failed to load posts" })),
            )
                .into_response()
        }
    }
}

/// Serve static assets, with the not found page for anything else
async fn static_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.inner.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => state.not_found(),
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve static file: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
