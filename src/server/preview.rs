//! Preview mode: entering with a CMS preview token and leaving again

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cms::{Document, PreviewData};
use crate::helpers::{encode_slug, redirect_document};
use crate::pages::POST_TYPE;

use super::AppState;

/// Cookie holding the signed preview session
pub const PREVIEW_COOKIE: &str = "__preview_data";

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    token: Option<String>,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExitParams {
    #[serde(rename = "currentUrl")]
    current_url: Option<String>,
}

/// Preview session carried by the request, if its cookie verifies
pub fn read_preview(jar: &SignedCookieJar) -> Option<PreviewData> {
    let cookie = jar.get(PREVIEW_COOKIE)?;
    match serde_json::from_str(cookie.value()) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::debug!("Ignoring malformed preview cookie: {}", e);
            None
        }
    }
}

/// Site path of a CMS document
pub fn link_resolver(doc: &Document<Value>) -> String {
    match doc.uid.as_deref() {
        Some(uid) if doc.doc_type == POST_TYPE && !uid.is_empty() => {
            format!("/post/{}", encode_slug(uid))
        }
        _ => "/".to_string(),
    }
}

/// `currentUrl` if it stays on this site, else the home page
pub fn safe_return_url(current_url: Option<&str>) -> &str {
    match current_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/",
    }
}

fn invalid_token() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid token" })),
    )
        .into_response()
}

/// GET /api/preview?token=&documentId=
pub async fn enter(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<PreviewParams>,
) -> Response {
    let Some(token) = params.token.filter(|t| !t.is_empty()) else {
        return invalid_token();
    };

    let client = state.generator().client(None);
    let url = match client
        .resolve_preview(&token, params.document_id.as_deref(), link_resolver, "/")
        .await
    {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Rejected preview token: {}", e);
            return invalid_token();
        }
    };

    let data = PreviewData { reference: token };
    let value = match serde_json::to_string(&data) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to encode preview data: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let cookie = Cookie::build((PREVIEW_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!("Entering preview, redirecting to {}", url);
    let body = redirect_document(&url);
    (
        StatusCode::TEMPORARY_REDIRECT,
        jar.add(cookie),
        [(header::LOCATION, url)],
        Html(body),
    )
        .into_response()
}

/// GET /api/exit-preview?currentUrl=
pub async fn exit(jar: SignedCookieJar, Query(params): Query<ExitParams>) -> Response {
    let mut removal = Cookie::build((PREVIEW_COOKIE, "")).path("/").build();
    removal.make_removal();

    let destination = safe_return_url(params.current_url.as_deref()).to_string();
    tracing::debug!("Leaving preview, redirecting to {}", destination);
    (
        StatusCode::TEMPORARY_REDIRECT,
        jar.add(removal),
        [(header::LOCATION, destination)],
    )
        .into_response()
}
