//! Listing page: the first page of posts and the "load more" state machine

use crate::cms::{CmsClient, CmsError, Ordering, Predicate, QueryOptions, SearchResponse};
use crate::content::{PostSummary, SummaryData};

use super::POST_TYPE;

/// Fields fetched for each listed post
pub const SUMMARY_FIELDS: &[&str] = &["posts.title", "posts.subtitle", "posts.author"];

/// A page of post summaries and the cursor to the following page
#[derive(Debug, Clone, Default)]
pub struct PostsPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl From<SearchResponse<SummaryData>> for PostsPagination {
    fn from(response: SearchResponse<SummaryData>) -> Self {
        Self {
            next_page: response.next_page,
            results: response.results,
        }
    }
}

/// Props of the listing page
#[derive(Debug, Clone)]
pub struct HomeProps {
    pub posts_pagination: PostsPagination,
    pub preview: bool,
}

/// Fetch the first page of posts, newest first
pub async fn get_home_props(client: &CmsClient, page_size: u32) -> Result<HomeProps, CmsError> {
    let response = client
        .query::<SummaryData>(
            &Predicate::at("document.type", POST_TYPE),
            &QueryOptions::new()
                .page_size(page_size)
                .order_by(Ordering::newest_first())
                .fetch(SUMMARY_FIELDS),
        )
        .await?;

    Ok(HomeProps {
        posts_pagination: response.into(),
        preview: client.is_preview(),
    })
}

/// Posts loaded so far in one page view, plus the cursor to the rest
///
/// Loads are appended in arrival order without deduplication. Only one load
/// may be in flight: [`Listing::begin_load`] hands out the cursor once and
/// refuses until the load completes or fails.
#[derive(Debug, Clone)]
pub struct Listing {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    in_flight: bool,
}

impl Listing {
    /// Start from the server-rendered first page
    pub fn new(first_page: PostsPagination) -> Self {
        Self {
            posts: first_page.results,
            next_page: first_page.next_page,
            in_flight: false,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Claim the cursor for a load; `None` while loading or when exhausted
    pub fn begin_load(&mut self) -> Option<String> {
        if self.in_flight {
            return None;
        }
        let cursor = self.next_page.clone()?;
        self.in_flight = true;
        Some(cursor)
    }

    /// Append a loaded page and replace the cursor with the page's own
    pub fn complete_load(&mut self, page: PostsPagination) {
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self.in_flight = false;
    }

    /// Give up on the current load, keeping the cursor for a retry
    pub fn fail_load(&mut self) {
        self.in_flight = false;
    }

    /// Load the next page; `Ok(false)` when there is nothing to load
    pub async fn load_more(&mut self, client: &CmsClient) -> Result<bool, CmsError> {
        let Some(cursor) = self.begin_load() else {
            return Ok(false);
        };

        match client.fetch_page::<SummaryData>(&cursor).await {
            Ok(page) => {
                tracing::debug!("Loaded {} more posts", page.results.len());
                self.complete_load(page.into());
                Ok(true)
            }
            Err(e) => {
                self.fail_load();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fake::{posts, FakeCms};

    fn summary(id: &str) -> PostSummary {
        PostSummary {
            id: id.to_string(),
            uid: Some(id.to_string()),
            doc_type: POST_TYPE.to_string(),
            first_publication_date: None,
            last_publication_date: None,
            data: SummaryData::default(),
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> PostsPagination {
        PostsPagination {
            next_page: next.map(str::to_string),
            results: ids.iter().map(|id| summary(id)).collect(),
        }
    }

    fn ids(listing: &Listing) -> Vec<&str> {
        listing.posts().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_append_is_order_preserving() {
        let mut stepwise = Listing::new(page(&["a", "b"], Some("c2")));
        stepwise.begin_load();
        stepwise.complete_load(page(&["c", "d"], Some("c3")));
        stepwise.begin_load();
        stepwise.complete_load(page(&["e"], None));

        let mut combined = Listing::new(page(&["a", "b"], Some("c2")));
        combined.begin_load();
        combined.complete_load(page(&["c", "d", "e"], None));

        assert_eq!(ids(&stepwise), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(ids(&stepwise), ids(&combined));
        assert!(!stepwise.has_more());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut listing = Listing::new(page(&["a"], Some("next")));
        listing.begin_load();
        listing.complete_load(page(&["a"], None));
        assert_eq!(ids(&listing), vec!["a", "a"]);
    }

    #[test]
    fn test_single_load_in_flight() {
        let mut listing = Listing::new(page(&["a"], Some("cursor-2")));
        assert_eq!(listing.begin_load().as_deref(), Some("cursor-2"));
        assert!(listing.is_loading());
        assert_eq!(listing.begin_load(), None);

        listing.fail_load();
        assert!(!listing.is_loading());
        assert_eq!(listing.next_page(), Some("cursor-2"));
        assert_eq!(listing.begin_load().as_deref(), Some("cursor-2"));
    }

    #[test]
    fn test_exhausted_listing_does_not_load() {
        let mut listing = Listing::new(page(&["a"], None));
        assert_eq!(listing.begin_load(), None);
        assert!(!listing.is_loading());
    }

    #[tokio::test]
    async fn test_load_more_exhausts_cursor() {
        let cms = FakeCms::start(posts(10)).await;
        let client = cms.config().client(None);

        let props = get_home_props(&client, 2).await.unwrap();
        assert!(!props.preview);
        let mut listing = Listing::new(props.posts_pagination);
        assert_eq!(ids(&listing), vec!["id10", "id9"]);

        let mut loads = 0;
        while listing.load_more(&client).await.unwrap() {
            loads += 1;
        }
        assert_eq!(loads, 4);
        assert!(!listing.has_more());
        assert!(!listing.load_more(&client).await.unwrap());

        let expected: Vec<String> = (1..=10).rev().map(|i| format!("id{}", i)).collect();
        assert_eq!(ids(&listing), expected);
        let titles: Vec<_> = listing.posts().iter().map(|p| p.data.title.as_str()).collect();
        assert_eq!(titles[0], "Post 10");
    }

    #[tokio::test]
    async fn test_summary_fields_only() {
        let cms = FakeCms::start(posts(1)).await;
        let client = cms.config().client(None);
        let props = get_home_props(&client, 2).await.unwrap();
        let post = &props.posts_pagination.results[0];
        assert_eq!(post.data.subtitle, "All about Post 1");
        assert_eq!(post.data.author, "Joseph Oliveira");
        assert!(post.first_publication_date.is_some());
        assert!(props.posts_pagination.next_page.is_none());
    }
}
