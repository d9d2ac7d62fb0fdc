use std::path::PathBuf;

use crate::aggregator::{parse_interval, shutdown_signal, Aggregator, Reporter, Scheduler};
use crate::app::{AppContext, GatorError, Result};
use crate::domain::{Feed, User};
use crate::store::Store;

pub fn register(ctx: &mut AppContext, name: &str) -> Result<()> {
    let user = ctx.store.create_user(name)?;
    ctx.config.set_current_user(&user.name)?;

    println!("Created user {}", user.name);
    println!("  - ID: {}", user.id);
    println!("  - Created: {}", user.created_at.format("%Y-%m-%d %H:%M:%S"));
    Ok(())
}

pub fn login(ctx: &mut AppContext, name: &str) -> Result<()> {
    let user = ctx
        .store
        .get_user_by_name(name)?
        .ok_or_else(|| GatorError::UserNotFound(name.to_string()))?;

    ctx.config.set_current_user(&user.name)?;
    println!("Logged in as {}", user.name);
    Ok(())
}

pub fn list_users(ctx: &AppContext) -> Result<()> {
    let current = ctx.config.current_user.as_deref();

    for user in ctx.store.get_users()? {
        let suffix = if current == Some(user.name.as_str()) {
            " (current)"
        } else {
            ""
        };
        println!("* {}{}", user.name, suffix);
    }

    Ok(())
}

pub fn reset(ctx: &AppContext) -> Result<()> {
    let deleted = ctx.store.delete_all_users()?;
    tracing::info!("Deleted {} users", deleted);
    println!("Database reset successful");
    Ok(())
}

pub fn add_feed(ctx: &AppContext, user: &User, name: &str, url: &str) -> Result<Feed> {
    url::Url::parse(url)?;

    let (feed, follow) = ctx.store.create_feed_and_follow(name, url, user.id)?;
    println!("{} now follows {}", follow.user_name, follow.feed_name);

    print_feed(&feed.name, &feed.url, &user.name);
    Ok(feed)
}

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.store.get_feeds_with_owner()?;

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in feeds {
        print_feed(&feed.feed_name, &feed.feed_url, &feed.user_name);
    }

    Ok(())
}

pub fn follow(ctx: &AppContext, user: &User, url: &str) -> Result<()> {
    let feed = ctx
        .store
        .get_feed_by_url(url)?
        .ok_or_else(|| GatorError::FeedNotFound(url.to_string()))?;

    let follow = ctx.store.create_feed_follow(user.id, feed.id)?;
    println!("{} now follows {}", follow.user_name, follow.feed_name);
    Ok(())
}

pub fn list_following(ctx: &AppContext, user: &User) -> Result<()> {
    let follows = ctx.store.get_feed_follows_for_user(user.id)?;

    if follows.is_empty() {
        println!("{} is not following any feeds", user.name);
        return Ok(());
    }

    for follow in follows {
        println!("* {}", follow.feed_name);
    }

    Ok(())
}

pub fn unfollow(ctx: &AppContext, user: &User, url: &str) -> Result<()> {
    let feed = ctx
        .store
        .get_feed_by_url(url)?
        .ok_or_else(|| GatorError::FeedNotFound(url.to_string()))?;

    if ctx.store.delete_feed_follow(user.id, feed.id)? {
        println!("Unfollowed: {}", url);
    } else {
        println!("Not following: {}", url);
    }

    Ok(())
}

pub fn browse(ctx: &AppContext, user: &User, limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(GatorError::InvalidArgument(
            "browse limit must be a positive number".into(),
        ));
    }

    let posts = ctx.store.get_posts_for_user(user.id, limit)?;

    if posts.is_empty() {
        println!("No posts yet. Run `gator agg` to collect some.");
        return Ok(());
    }

    for entry in posts {
        let when = entry
            .post
            .published_at
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "unknown date".to_string());

        println!("* {} ({})", entry.post.display_title(), entry.feed_name);
        println!("  - {}", entry.post.url);
        println!("  - {}", when);
    }

    Ok(())
}

/// Run the aggregation loop until SIGINT/SIGTERM.
///
/// An invalid interval fails here, before any cycle runs.
pub async fn aggregate(ctx: &AppContext, interval: &str, log: Option<PathBuf>) -> Result<()> {
    let every = parse_interval(interval)?;

    let aggregator = Aggregator::new(
        ctx.store.clone(),
        ctx.fetcher.clone(),
        ctx.parser.clone(),
        Reporter::new(log),
    );
    let scheduler = Scheduler::new(aggregator, every);

    let cycles = scheduler.run_until(shutdown_signal()).await;
    tracing::info!("Aggregator stopped after {} cycles", cycles);

    Ok(())
}

fn print_feed(name: &str, url: &str, user_name: &str) {
    println!("* {}", name);
    println!("  - URL: {}", url);
    println!("  - User: {}", user_name);
}
