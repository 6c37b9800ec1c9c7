//! Query building for the content API search endpoint

use std::fmt;

/// A document predicate, sent as the `q` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match on a field, e.g. `document.type` or `my.posts.uid`
    At(String, String),
}

impl Predicate {
    pub fn at(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At(field.into(), value.into())
    }

    /// Render as the `q` query parameter
    pub fn to_query(&self) -> String {
        match self {
            Predicate::At(field, value) => {
                format!("[[at({}, \"{}\")]]", field, value.replace('"', "\\\""))
            }
        }
    }
}

/// Result ordering on a document field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    /// Most recently published first
    pub fn newest_first() -> Self {
        Self {
            field: "document.first_publication_date".to_string(),
            descending: true,
        }
    }

    /// Earliest published first
    pub fn oldest_first() -> Self {
        Self {
            field: "document.first_publication_date".to_string(),
            descending: false,
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "[{} desc]", self.field)
        } else {
            write!(f, "[{}]", self.field)
        }
    }
}

/// Search options: paging, ordering, the `after` cursor and field selection
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    /// Exclusive cursor: only documents after this id in the ordering
    pub after: Option<String>,
    pub orderings: Option<Ordering>,
    /// Restrict `data` to these fields, e.g. `posts.title`
    pub fetch: Vec<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    pub fn order_by(mut self, ordering: Ordering) -> Self {
        self.orderings = Some(ordering);
        self
    }

    pub fn fetch(mut self, fields: &[&str]) -> Self {
        self.fetch = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Query string pairs, excluding `ref`, `q` and the access token
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(after) = &self.after {
            params.push(("after", after.clone()));
        }
        if let Some(ordering) = &self.orderings {
            params.push(("orderings", ordering.to_string()));
        }
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        params
    }
}
