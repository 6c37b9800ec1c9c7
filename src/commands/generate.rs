//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Render the listing and prebuilt posts into the public directory
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(&blog.config)?;
    let count = generator.generate(&blog.public_dir).await?;

    let duration = start.elapsed();
    tracing::info!("Generated {} pages in {:.2}s", count, duration.as_secs_f64());

    Ok(())
}
