use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gator::app::AppContext;
use gator::cli::{commands, Cli, Commands};
use gator::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let mut ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Register { name } => {
            commands::register(&mut ctx, &name)?;
        }
        Commands::Login { name } => {
            commands::login(&mut ctx, &name)?;
        }
        Commands::Users => {
            commands::list_users(&ctx)?;
        }
        Commands::Reset => {
            commands::reset(&ctx)?;
        }
        Commands::AddFeed { name, url } => {
            let user = ctx.current_user()?;
            commands::add_feed(&ctx, &user, &name, &url)?;
        }
        Commands::Feeds => {
            commands::list_feeds(&ctx)?;
        }
        Commands::Follow { url } => {
            let user = ctx.current_user()?;
            commands::follow(&ctx, &user, &url)?;
        }
        Commands::Following => {
            let user = ctx.current_user()?;
            commands::list_following(&ctx, &user)?;
        }
        Commands::Unfollow { url } => {
            let user = ctx.current_user()?;
            commands::unfollow(&ctx, &user, &url)?;
        }
        Commands::Browse { limit } => {
            let user = ctx.current_user()?;
            commands::browse(&ctx, &user, limit)?;
        }
        Commands::Agg { interval, log } => {
            commands::aggregate(&ctx, &interval, log).await?;
        }
    }

    Ok(())
}
