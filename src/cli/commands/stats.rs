//! Stats command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::analytics;

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let blogs = store.list_blogs().await?;

    if blogs.is_empty() {
        println!("No blogs stored yet.");
        return Ok(());
    }

    let stats = analytics::summarize(&blogs);

    println!("Blog statistics ({} blogs)", blogs.len());
    println!("{:-<50}", "");
    println!("Total likes:    {}", stats.total_likes);

    if let Some(fav) = &stats.favorite_blog {
        println!(
            "Favorite blog:  {} by {} ({} likes)",
            fav.title,
            fav.author.as_deref().unwrap_or("unknown"),
            fav.likes
        );
    }

    if let Some(most) = &stats.most_blogs {
        println!(
            "Most blogs:     {} ({})",
            most.author.as_deref().unwrap_or("unknown"),
            most.blogs
        );
    }

    if let Some(most) = &stats.most_likes {
        println!(
            "Most likes:     {} ({})",
            most.author.as_deref().unwrap_or("unknown"),
            most.likes
        );
    }

    Ok(())
}
