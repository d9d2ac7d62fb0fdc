pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gator")]
#[command(about = "A multi-user RSS feed aggregator", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/gator/config.toml)
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a user and log in as them
    Register {
        /// Name of the new user
        name: String,
    },
    /// Log in as an existing user
    Login {
        /// Name of the user
        name: String,
    },
    /// List all users
    Users,
    /// Delete all users, feeds, follows and posts
    Reset,
    /// Register a feed and follow it
    #[command(name = "addfeed")]
    AddFeed {
        /// Display name of the feed
        name: String,
        /// URL of the RSS document
        url: String,
    },
    /// List all registered feeds
    Feeds,
    /// Follow a registered feed
    Follow {
        /// URL of the feed to follow
        url: String,
    },
    /// List the feeds you follow
    Following,
    /// Stop following a feed
    Unfollow {
        /// URL of the feed to unfollow
        url: String,
    },
    /// Show the newest posts from the feeds you follow
    Browse {
        /// Number of posts to show
        #[arg(default_value_t = 2)]
        limit: usize,
    },
    /// Fetch feeds continuously, one per interval, until interrupted
    Agg {
        /// Time between requests (e.g., "500ms", "10s", "1m", "1h")
        interval: String,

        /// Log file path (default: stdout)
        #[arg(short, long)]
        log: Option<std::path::PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addfeed() {
        let cli = Cli::try_parse_from(["gator", "addfeed", "HN", "https://news.ycombinator.com/rss"])
            .unwrap();
        match cli.command {
            Commands::AddFeed { name, url } => {
                assert_eq!(name, "HN");
                assert_eq!(url, "https://news.ycombinator.com/rss");
            }
            _ => panic!("expected addfeed"),
        }
    }

    #[test]
    fn test_parse_agg_with_log() {
        let cli = Cli::try_parse_from(["gator", "agg", "10s", "--log", "/tmp/agg.log"]).unwrap();
        match cli.command {
            Commands::Agg { interval, log } => {
                assert_eq!(interval, "10s");
                assert_eq!(log, Some("/tmp/agg.log".into()));
            }
            _ => panic!("expected agg"),
        }
    }

    #[test]
    fn test_browse_default_limit() {
        let cli = Cli::try_parse_from(["gator", "browse"]).unwrap();
        assert!(matches!(cli.command, Commands::Browse { limit: 2 }));
    }

    #[test]
    fn test_agg_requires_interval() {
        assert!(Cli::try_parse_from(["gator", "agg"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["gator", "users", "--config", "/tmp/gator.toml"]).unwrap();
        assert_eq!(cli.config, Some("/tmp/gator.toml".into()));
    }
}
