//! Documents and responses returned by the content API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A CMS document with typed `data`
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub id: String,

    /// Human-readable unique id, used as the page slug
    #[serde(default)]
    pub uid: Option<String>,

    #[serde(rename = "type")]
    pub doc_type: String,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub first_publication_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_publication_date: Option<DateTime<Utc>>,

    pub data: T,
}

/// One page of search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    /// Opaque URL of the following page, absent on the last page
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<Document<T>>,
}

/// API root, listing the available content refs
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRoot {
    #[serde(default)]
    pub refs: Vec<Ref>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ref {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// Preview session payload stored in the preview cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewData {
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Parse a CMS timestamp such as `2021-03-25T19:25:28+0000` (RFC 3339 is also accepted)
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|date| date.with_timezone(&Utc))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
        .transpose()
}
