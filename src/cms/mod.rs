//! Content API client
//!
//! A thin wrapper over the CMS REST search API. [`CmsConfig`] is the only
//! process-wide content setting; it is built from the site configuration and
//! handed to whatever needs a client.

mod document;
mod query;

#[cfg(test)]
pub(crate) mod fake;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use document::{parse_timestamp, ApiRoot, Document, PreviewData, Ref, SearchResponse};
pub use query::{Ordering, Predicate, QueryOptions};

/// Errors returned by the content API client
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("content API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("content API did not advertise a master ref")]
    NoMasterRef,

    #[error("cursor does not belong to the content API: {0}")]
    ForeignCursor(String),
}

/// Content repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API base, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
        }
    }
}

impl CmsConfig {
    /// Get a fresh client, scoped to the preview ref when one is given
    pub fn client(&self, preview: Option<&PreviewData>) -> CmsClient {
        CmsClient {
            http: reqwest::Client::new(),
            endpoint: self.endpoint.trim_end_matches('/').to_string(),
            access_token: self.access_token.clone().filter(|t| !t.is_empty()),
            preview_ref: preview.map(|p| p.reference.clone()),
        }
    }
}

/// Handle to the content repository
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    preview_ref: Option<String>,
}

impl CmsClient {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether queries resolve against a preview ref
    pub fn is_preview(&self) -> bool {
        self.preview_ref.is_some()
    }

    /// The same client, resolving against the given ref
    pub fn with_ref(&self, reference: &str) -> Self {
        Self {
            preview_ref: Some(reference.to_string()),
            ..self.clone()
        }
    }

    /// Look up the published (master) ref from the API root
    pub async fn master_ref(&self) -> Result<String, CmsError> {
        let mut request = self.http.get(&self.endpoint);
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token)]);
        }
        let root: ApiRoot = read_json(request.send().await?).await?;
        root.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(CmsError::NoMasterRef)
    }

    async fn current_ref(&self) -> Result<String, CmsError> {
        match &self.preview_ref {
            Some(reference) => Ok(reference.clone()),
            None => self.master_ref().await,
        }
    }

    /// Search documents
    pub async fn query<T: DeserializeOwned>(
        &self,
        predicate: &Predicate,
        options: &QueryOptions,
    ) -> Result<SearchResponse<T>, CmsError> {
        let reference = self.current_ref().await?;

        let mut params = vec![("ref", reference), ("q", predicate.to_query())];
        params.extend(options.to_params());
        if let Some(token) = &self.access_token {
            params.push(("access_token", token.clone()));
        }

        let url = format!("{}/documents/search", self.endpoint);
        tracing::debug!("Querying {} with {}", url, predicate.to_query());

        let response = self.http.get(&url).query(&params).send().await?;
        read_json(response).await
    }

    /// Get a single document of `doc_type` by its uid
    pub async fn get_by_uid<T: DeserializeOwned>(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> Result<Option<Document<T>>, CmsError> {
        let predicate = Predicate::at(format!("my.{}.uid", doc_type), uid);
        let response = self
            .query::<T>(&predicate, &QueryOptions::new().page_size(1))
            .await?;
        Ok(response.results.into_iter().next())
    }

    /// Get a single document by its id
    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        id: &str,
    ) -> Result<Option<Document<T>>, CmsError> {
        let predicate = Predicate::at("document.id", id);
        let response = self
            .query::<T>(&predicate, &QueryOptions::new().page_size(1))
            .await?;
        Ok(response.results.into_iter().next())
    }

    /// Follow a `next_page` cursor returned by an earlier search
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<SearchResponse<T>, CmsError> {
        if !self.owns_url(url) {
            return Err(CmsError::ForeignCursor(url.to_string()));
        }
        let mut url =
            reqwest::Url::parse(url).map_err(|_| CmsError::ForeignCursor(url.to_string()))?;

        if let Some(token) = &self.access_token {
            let has_token = url.query_pairs().any(|(key, _)| key == "access_token");
            if !has_token {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }

        tracing::debug!("Fetching page {}", url);
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    /// Whether `url` points below the configured endpoint
    pub fn owns_url(&self, url: &str) -> bool {
        match url.strip_prefix(self.endpoint.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    /// Resolve where a preview session should land
    ///
    /// The token is checked by querying with it as the ref; an unknown ref
    /// fails the request. With a document id, the document is looked up in
    /// that ref and mapped through `link_resolver`; otherwise, or when the
    /// document is absent, `default_url` is returned.
    pub async fn resolve_preview<F>(
        &self,
        token: &str,
        document_id: Option<&str>,
        link_resolver: F,
        default_url: &str,
    ) -> Result<String, CmsError>
    where
        F: Fn(&Document<serde_json::Value>) -> String,
    {
        let previewing = self.with_ref(token);

        match document_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let doc = previewing.get_by_id::<serde_json::Value>(id).await?;
                Ok(doc
                    .map(|doc| link_resolver(&doc))
                    .unwrap_or_else(|| default_url.to_string()))
            }
            None => {
                previewing
                    .query::<serde_json::Value>(
                        &Predicate::at("document.type", "posts"),
                        &QueryOptions::new().page_size(1),
                    )
                    .await?;
                Ok(default_url.to_string())
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CmsError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CmsError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json::<T>().await?)
}
