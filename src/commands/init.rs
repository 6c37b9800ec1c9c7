//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling.
language: pt-BR
timezone: America/Sao_Paulo

# Directory
public_dir: public
static_dir: static

# Content API
# PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override these
cms:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  access_token:

# Listing page
listing:
  page_size: 2
  revalidate: 30

# Post pages
post:
  revalidate: 1800
  prebuild: 1
  fallback: blocking

# Comments (utterances)
comments:
  enable: true
  repo: rvieceli/next-1
  issue_term: pathname
  label: "comment :speech_balloon:"
  theme: photon-dark

# Preview mode
# PREVIEW_COOKIE_SECRET overrides this; needs at least 64 bytes
preview:
  cookie_secret: ''
"#;

const GLOBAL_CSS: &str = r#"* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: #1a1d23; color: #d7d7d7; font-family: Inter, sans-serif; }
a { color: inherit; text-decoration: none; }
.header, .container { max-width: 720px; margin: 0 auto; padding: 0 1rem; }
.header { padding-top: 4rem; padding-bottom: 4rem; }
.banner { width: 100%; max-height: 400px; object-fit: cover; }
.post-summary { display: block; margin-bottom: 3rem; }
.post-summary strong { font-size: 1.75rem; color: #f8f8f8; }
.post-summary footer, .post .info { display: flex; gap: 1.5rem; margin-top: 1.5rem; }
.text-with-icon { display: flex; align-items: center; gap: 0.5rem; font-size: 0.875rem; }
.link { background: none; border: 0; color: #ff57b2; font-size: 1.125rem; cursor: pointer; }
.post h1 { font-size: 3rem; margin-top: 5rem; color: #f8f8f8; }
.post time { display: block; margin-top: 1.5rem; font-style: italic; font-size: 0.875rem; }
.post section { margin-top: 4rem; line-height: 1.6; }
.post section h2 { font-size: 2.25rem; margin-bottom: 2rem; color: #f8f8f8; }
.post-nav {
  display: flex; justify-content: space-between;
  margin-top: 4rem; padding-top: 3rem; border-top: 1px solid #333;
}
.post-nav a { display: flex; flex-direction: column; }
.post-nav .next { text-align: right; }
.post-nav strong { color: #ff57b2; }
.comments { margin-top: 4rem; }
.exit-preview {
  margin: 4rem 0; padding: 1rem; background: #ff57b2; border-radius: 2rem; text-align: center;
}
"#;

const ICONS: &[(&str, &str)] = &[
    (
        "logo.svg",
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="26">"##,
            r##"<text x="0" y="20" fill="#f8f8f8" font-family="sans-serif" font-size="22">"##,
            r##"spacetraveling<tspan fill="#ff57b2">.</tspan></text></svg>"##
        ),
    ),
    (
        "calendar.svg",
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" fill="none""##,
            r##" stroke="#bbb" stroke-width="2" viewBox="0 0 24 24">"##,
            r##"<rect x="3" y="4" width="18" height="18" rx="2"/>"##,
            r##"<path d="M16 2v4M8 2v4M3 10h18"/></svg>"##
        ),
    ),
    (
        "user.svg",
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" fill="none""##,
            r##" stroke="#bbb" stroke-width="2" viewBox="0 0 24 24">"##,
            r##"<path d="M20 21v-2a4 4 0 0 0-4-4H8a4 4 0 0 0-4 4v2"/>"##,
            r##"<circle cx="12" cy="7" r="4"/></svg>"##
        ),
    ),
    (
        "clock.svg",
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" fill="none""##,
            r##" stroke="#bbb" stroke-width="2" viewBox="0 0 24 24">"##,
            r##"<circle cx="12" cy="12" r="10"/><path d="M12 6v6l4 2"/></svg>"##
        ),
    ),
];

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    // Create directory structure
    fs::create_dir_all(target_dir.join("static/images"))?;
    fs::create_dir_all(target_dir.join("static/styles"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, keeping it", config_path);
    } else {
        fs::write(&config_path, CONFIG)?;
    }

    fs::write(target_dir.join("static/styles/global.css"), GLOBAL_CSS)?;
    for (name, svg) in ICONS {
        fs::write(target_dir.join("static/images").join(name), svg)?;
    }

    Ok(())
}
