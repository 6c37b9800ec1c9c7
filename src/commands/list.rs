//! List posts from the content API

use anyhow::Result;

use crate::content::PostSummary;
use crate::generator::post_route;
use crate::helpers::DateFormatter;
use crate::i18n::I18n;
use crate::pages::home::{get_home_props, Listing};
use crate::Blog;

/// Walk every page of the listing and print the posts
pub async fn run(blog: &Blog) -> Result<()> {
    let posts = load_all(blog).await?;
    let i18n = I18n::new(&blog.config.language)?;
    let dates = DateFormatter::from_config(&blog.config, &i18n)?;

    println!("Posts ({}):", posts.len());
    for post in &posts {
        println!(
            "  {} - {} [{}]",
            dates.format_optional(post.first_publication_date.as_ref()),
            post.data.title,
            post_route(post.uid.as_deref().unwrap_or_default())
        );
    }

    Ok(())
}

/// Every post, newest first, following the listing cursor to the end
pub async fn load_all(blog: &Blog) -> Result<Vec<PostSummary>> {
    let client = blog.config.cms.client(None);
    let props = get_home_props(&client, blog.config.listing.page_size).await?;

    let mut listing = Listing::new(props.posts_pagination);
    while listing.load_more(&client).await? {}

    Ok(listing.posts().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fake::{posts, FakeCms};

    #[tokio::test]
    async fn test_load_all_follows_cursor() {
        let cms = FakeCms::start(posts(5)).await;
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.cms = cms.config();

        let all = load_all(&blog).await.unwrap();
        let uids: Vec<_> = all.iter().filter_map(|p| p.uid.as_deref()).collect();
        assert_eq!(uids, vec!["post-5", "post-4", "post-3", "post-2", "post-1"]);
        run(&blog).await.unwrap();
    }
}
