use crate::api::models::Platform;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "xpost",
    about = "Crosspost CLI for composing, scheduling and publishing posts",
    version,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version information
    Version,

    /// Log in to your Crosspost account
    Login,

    /// Log out from your account
    Logout,

    /// Check the current authentication status
    Status,

    /// Connect a platform account via OAuth
    Connect {
        /// Platform to connect: reddit, twitter, linkedin, facebook, instagram
        platform: Platform,
    },

    /// Disconnect a platform account
    Disconnect {
        /// Platform to disconnect
        platform: Platform,
    },

    /// List connected platform accounts
    Accounts {
        /// Show the locally cached list instead of calling the API
        #[arg(long)]
        cached: bool,
    },

    /// Compose and publish or schedule a post
    Post {
        /// The text of the post (can be specified multiple times, one per paragraph)
        #[arg(short = 'm', long = "message", required_unless_present = "edit")]
        messages: Vec<String>,

        /// Target platforms, comma-separated (falls back to config, then an interactive picker)
        #[arg(short = 'p', long = "platforms", value_delimiter = ',')]
        platforms: Option<Vec<Platform>>,

        /// Open editor to write the post
        #[arg(long)]
        edit: bool,

        /// Media URLs to attach (comma-separated)
        #[arg(long = "media", value_delimiter = ',')]
        media: Option<Vec<String>>,

        /// When to publish, e.g. "2h", "tomorrow", "2030-09-01T09:00"
        #[arg(short = 's', long = "schedule")]
        schedule: Option<String>,

        /// Skip the publish confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// List posts in the queue
    #[command(alias = "ls")]
    Queue {
        /// Filter by status (draft, queued, publishing, published, partial, failed)
        #[arg(long = "status")]
        status: Option<String>,

        /// Maximum number of posts to return
        #[arg(short = 'n', long = "limit", default_value = "20")]
        limit: u32,

        /// Show full post content instead of truncated preview
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /// Follow the delivery reports for a post
    Watch {
        /// The post id to follow
        post_id: String,
    },
}
