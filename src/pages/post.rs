//! Post page: the post, its neighbours and static paths

use chrono::{DateTime, Utc};

use crate::cms::{CmsClient, CmsError, Ordering, Predicate, QueryOptions};
use crate::content::{reading_time, NavPost, Post, PostData, TitleData};

use super::POST_TYPE;

/// Props of a post page
#[derive(Debug, Clone)]
pub struct PostProps {
    pub post: Post,
    /// Adjacent post in publication order (ascending)
    pub previous: Option<NavPost>,
    /// Adjacent post in reverse publication order (descending)
    pub next: Option<NavPost>,
    pub preview: bool,
}

impl PostProps {
    /// Estimated reading time in minutes
    pub fn reading_time(&self) -> usize {
        reading_time(&self.post.data.content)
    }

    /// When the post was edited after publication
    ///
    /// A republish that leaves the last publication date equal to the first
    /// one is not shown as an edit.
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        match (
            self.post.first_publication_date,
            self.post.last_publication_date,
        ) {
            (Some(first), Some(last)) if first == last => None,
            (_, last) => last,
        }
    }
}

/// Fetch a post by slug along with its neighbours; `None` if no post has that slug
pub async fn get_post_props(client: &CmsClient, slug: &str) -> Result<Option<PostProps>, CmsError> {
    let Some(post) = client.get_by_uid::<PostData>(POST_TYPE, slug).await? else {
        return Ok(None);
    };

    let next = neighbour(client, &post.id, Ordering::newest_first()).await?;
    let previous = neighbour(client, &post.id, Ordering::oldest_first()).await?;

    Ok(Some(PostProps {
        post,
        previous,
        next,
        preview: client.is_preview(),
    }))
}

/// First post after `id` in the given ordering
async fn neighbour(
    client: &CmsClient,
    id: &str,
    ordering: Ordering,
) -> Result<Option<NavPost>, CmsError> {
    let response = client
        .query::<TitleData>(
            &Predicate::at("document.type", POST_TYPE),
            &QueryOptions::new()
                .page_size(1)
                .after(id)
                .order_by(ordering)
                .fetch(&["posts.title"]),
        )
        .await?;
    Ok(response.results.into_iter().next())
}

/// Slugs of the `count` most recent posts, rendered ahead of time
pub async fn get_static_paths(client: &CmsClient, count: u32) -> Result<Vec<String>, CmsError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let response = client
        .query::<TitleData>(
            &Predicate::at("document.type", POST_TYPE),
            &QueryOptions::new()
                .page_size(count)
                .order_by(Ordering::newest_first())
                .fetch(&["posts.title"]),
        )
        .await?;
    Ok(response.results.into_iter().filter_map(|doc| doc.uid).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fake::{post_doc, posts, FakeCms};
    use crate::cms::PreviewData;

    #[tokio::test]
    async fn test_post_with_neighbours() {
        let cms = FakeCms::start(posts(3)).await;
        let client = cms.config().client(None);

        let props = get_post_props(&client, "post-2").await.unwrap().unwrap();
        assert_eq!(props.post.id, "id2");
        assert_eq!(props.post.data.title, "Post 2");
        assert_eq!(
            props.post.data.banner.url.as_deref(),
            Some("https://images.test/post-2.png")
        );
        assert_eq!(props.next.as_ref().unwrap().data.title, "Post 1");
        assert_eq!(props.previous.as_ref().unwrap().uid.as_deref(), Some("post-3"));
        assert_eq!(props.reading_time(), 1);
        assert_eq!(props.edited_at(), None);
        assert!(!props.preview);
    }

    #[tokio::test]
    async fn test_edge_posts_have_one_neighbour() {
        let cms = FakeCms::start(posts(3)).await;
        let client = cms.config().client(None);

        let newest = get_post_props(&client, "post-3").await.unwrap().unwrap();
        assert!(newest.previous.is_none());
        assert_eq!(newest.next.unwrap().id, "id2");

        let oldest = get_post_props(&client, "post-1").await.unwrap().unwrap();
        assert!(oldest.next.is_none());
        assert_eq!(oldest.previous.unwrap().id, "id2");
    }

    #[tokio::test]
    async fn test_unknown_slug() {
        let cms = FakeCms::start(posts(2)).await;
        let client = cms.config().client(None);
        assert!(get_post_props(&client, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_preview_ref_resolves_drafts() {
        let mut cms = FakeCms::start(posts(1)).await;
        cms.add_preview(
            "draft-ref",
            vec![post_doc("id9", "draft", "Draft", "2021-04-01T10:00:00+0000")],
        );

        let published = cms.config().client(None);
        assert!(get_post_props(&published, "draft").await.unwrap().is_none());

        let preview = PreviewData {
            reference: "draft-ref".to_string(),
        };
        let previewing = cms.config().client(Some(&preview));
        let props = get_post_props(&previewing, "draft").await.unwrap().unwrap();
        assert!(props.preview);
        assert_eq!(props.next.unwrap().id, "id1");
    }

    #[tokio::test]
    async fn test_static_paths() {
        let cms = FakeCms::start(posts(4)).await;
        let client = cms.config().client(None);
        assert_eq!(get_static_paths(&client, 2).await.unwrap(), vec!["post-4", "post-3"]);
        assert!(get_static_paths(&client, 0).await.unwrap().is_empty());
    }

    #[test]
    fn test_edited_at_uses_last_publication() {
        let mut doc = post_doc("id1", "a", "A", "2021-03-01T10:00:00+0000");
        doc["last_publication_date"] = "2021-03-02T08:30:00+0000".into();
        let post: Post = serde_json::from_value(doc).unwrap();
        let props = PostProps {
            post,
            previous: None,
            next: None,
            preview: false,
        };
        assert_eq!(
            props.edited_at().unwrap(),
            crate::cms::parse_timestamp("2021-03-02T08:30:00+0000").unwrap()
        );
    }

    #[test]
    fn test_edited_at_skips_unchanged_republish() {
        let mut doc = post_doc("id1", "a", "A", "2021-03-01T10:00:00+0000");
        doc["last_publication_date"] = "2021-03-01T10:00:00+0000".into();
        let post: Post = serde_json::from_value(doc).unwrap();
        let props = PostProps {
            post,
            previous: None,
            next: None,
            preview: false,
        };
        assert_eq!(props.edited_at(), None);
    }
}
