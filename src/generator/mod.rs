//! Generator module - renders pages from CMS content using built-in Tera templates

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::Context;

use crate::cms::{CmsClient, CmsError, PreviewData};
use crate::comments::Element;
use crate::config::SiteConfig;
use crate::content::{rich_text, NavPost, PostSummary, SummaryData};
use crate::helpers::DateFormatter;
use crate::i18n::I18n;
use crate::pages::home::{get_home_props, HomeProps, PostsPagination};
use crate::pages::post::{get_post_props, get_static_paths, PostProps};
use crate::templates::{NavView, PostView, SectionView, SummaryView, TemplateRenderer};

/// Route of the listing page
pub const HOME_ROUTE: &str = "/";

/// Route of a post page
pub fn post_route(slug: &str) -> String {
    format!("/post/{}", slug)
}

/// One page of summaries for the "load more" endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MorePosts {
    pub next_page: Option<String>,
    pub results: Vec<MoreItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoreItem {
    #[serde(flatten)]
    pub post: SummaryView,
    /// The summary rendered the same way as on the listing page
    pub html: String,
}

/// Page generator using Tera templates
pub struct Generator {
    config: SiteConfig,
    i18n: I18n,
    renderer: TemplateRenderer,
    dates: DateFormatter,
}

impl Generator {
    /// Create a new generator
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let i18n = I18n::new(&config.language)?;
        let renderer = TemplateRenderer::new(&i18n)?;
        let dates = DateFormatter::from_config(config, &i18n)?;

        Ok(Self {
            config: config.clone(),
            i18n,
            renderer,
            dates,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Content client, scoped to the preview session when there is one
    pub fn client(&self, preview: Option<&PreviewData>) -> CmsClient {
        self.config.cms.client(preview)
    }

    /// Fetch and render the listing page
    pub async fn home(&self, preview: Option<&PreviewData>) -> Result<String> {
        let client = self.client(preview);
        let props = get_home_props(&client, self.config.listing.page_size).await?;
        tracing::debug!(
            "Rendering home with {} posts",
            props.posts_pagination.results.len()
        );
        self.render_home(&props)
    }

    /// Fetch and render a post page; `None` if the slug does not exist
    pub async fn post(&self, slug: &str, preview: Option<&PreviewData>) -> Result<Option<String>> {
        let client = self.client(preview);
        match get_post_props(&client, slug).await? {
            Some(props) => Ok(Some(self.render_post(&props)?)),
            None => Ok(None),
        }
    }

    /// Follow a listing cursor and render the summaries it yields
    pub async fn more_posts(&self, cursor: &str) -> Result<MorePosts, CmsError> {
        let client = self.client(None);
        let page: PostsPagination = client.fetch_page::<SummaryData>(cursor).await?.into();

        let mut results = Vec::with_capacity(page.results.len());
        for summary in &page.results {
            let post = self.summary_view(summary);
            let html = self.render_summary(&post).unwrap_or_else(|e| {
                tracing::error!("Failed to render summary {}: {}", summary.id, e);
                String::new()
            });
            results.push(MoreItem { post, html });
        }

        Ok(MorePosts {
            next_page: page.next_page,
            results,
        })
    }

    /// Slugs of the most recent posts, rendered ahead of time
    pub async fn prebuilt_slugs(&self) -> Result<Vec<String>> {
        let client = self.client(None);
        let mut slugs = get_static_paths(&client, self.config.post.prebuild).await?;
        slugs.retain(|slug| {
            let safe = !slug.is_empty() && !slug.contains(['/', '\\']) && !slug.contains("..");
            if !safe {
                tracing::warn!("Skipping post with unsafe slug {:?}", slug);
            }
            safe
        });
        Ok(slugs)
    }

    /// Write the listing and prebuilt posts as static files; returns the page count
    pub async fn generate(&self, public_dir: &Path) -> Result<usize> {
        fs::create_dir_all(public_dir)?;

        let home = self.home(None).await?;
        fs::write(public_dir.join("index.html"), home)?;
        let mut written = 1;

        for slug in self.prebuilt_slugs().await? {
            let Some(html) = self.post(&slug, None).await? else {
                tracing::warn!("Post {} disappeared during generation", slug);
                continue;
            };
            let dir = public_dir.join("post").join(&slug);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join("index.html"), html)?;
            tracing::debug!("Generated {}", post_route(&slug));
            written += 1;
        }

        Ok(written)
    }

    /// Create a base context with common variables
    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("lang", self.i18n.language());
        context.insert("site_title", &self.config.title);
        context
    }

    pub fn summary_view(&self, post: &PostSummary) -> SummaryView {
        SummaryView {
            uid: post.uid.clone().unwrap_or_default(),
            title: post.data.title.clone(),
            subtitle: post.data.subtitle.clone(),
            author: post.data.author.clone(),
            first_publication_date: self
                .dates
                .format_optional(post.first_publication_date.as_ref()),
        }
    }

    fn nav_view(post: &NavPost) -> Option<NavView> {
        Some(NavView {
            uid: post.uid.clone()?,
            title: post.data.title.clone(),
        })
    }

    pub fn render_home(&self, props: &HomeProps) -> Result<String> {
        let posts: Vec<SummaryView> = props
            .posts_pagination
            .results
            .iter()
            .map(|p| self.summary_view(p))
            .collect();

        let mut context = self.base_context();
        context.insert("posts", &posts);
        context.insert("next_page", &props.posts_pagination.next_page);
        context.insert("preview", &props.preview);
        self.renderer.render("home.html", &context)
    }

    pub fn render_summary(&self, post: &SummaryView) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", post);
        self.renderer.render("partials/post_summary.html", &context)
    }

    pub fn render_post(&self, props: &PostProps) -> Result<String> {
        let post = &props.post;
        let view = PostView {
            id: post.id.clone(),
            title: post.data.title.clone(),
            author: post.data.author.clone(),
            banner_url: post.data.banner.url.clone(),
            first_publication_date: self
                .dates
                .format_optional(post.first_publication_date.as_ref()),
            edited_at: props
                .edited_at()
                .map(|date| self.dates.format_date_time(&date)),
            reading_time: format!("{} {}", props.reading_time(), self.i18n.get("minutes")),
            sections: post
                .data
                .content
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.clone(),
                    html: rich_text::as_html(&section.body),
                })
                .collect(),
        };

        let mut context = self.base_context();
        context.insert("post", &view);
        context.insert("previous", &props.previous.as_ref().and_then(Self::nav_view));
        context.insert("next", &props.next.as_ref().and_then(Self::nav_view));
        context.insert("comments", &self.render_comments(&post.id));
        context.insert("preview", &props.preview);
        self.renderer.render("post.html", &context)
    }

    /// Comment anchor for a post, with the widget mounted when enabled
    fn render_comments(&self, post_id: &str) -> String {
        let mut section = Element::new("div")
            .with_attr("class", "comments")
            .with_child(Element::new("div").with_attr("id", post_id));

        if !self.config.comments.enable {
            return section.to_html();
        }

        let mounted = self
            .config
            .comments
            .mount(&mut section, post_id)
            .map(|widget| widget.root().to_html());
        mounted.unwrap_or_else(|| section.to_html())
    }

    pub fn render_loading(&self) -> Result<String> {
        self.renderer.render("loading.html", &self.base_context())
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer.render("not_found.html", &self.base_context())
    }
}
