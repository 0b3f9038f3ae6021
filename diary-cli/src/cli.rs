use clap::{Parser, Subcommand};
use diary_client::moderation::StatusFilter;
use diary_client::session::SessionSlot;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API origin
    #[arg(short, long, env = "DIARY_API_URL")]
    pub server: Option<String>,

    /// Where tokens and the cached user are kept
    #[arg(long, env = "DIARY_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        nickname: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        confirm_password: String,
    },

    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    Logout,

    Status,

    /// Browse approved diaries
    List {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = diary_client::feed::DEFAULT_PAGE_SIZE)]
        page_size: u32,

        /// Keep loading pages until the last one
        #[arg(long)]
        all: bool,
    },

    Show {
        id: String,
    },

    Publish {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// Image file, repeat for several (1 to 10)
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,

        #[arg(long)]
        video: Option<PathBuf>,
    },

    /// Edit one of your diaries that is not approved yet
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        /// Empty string removes the video
        #[arg(long)]
        video_url: Option<String>,
    },

    Delete {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },

    /// Your own diaries with moderation status
    Mine,

    Profile,

    ProfileUpdate {
        #[arg(short, long)]
        nickname: Option<String>,

        #[arg(short, long)]
        avatar: Option<PathBuf>,
    },

    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Subcommand)]
pub enum AdminCommands {
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    Logout,

    /// all, pending, approved or rejected
    List {
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },

    Approve {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    Reject {
        id: String,

        /// Required for pending diaries
        #[arg(short, long)]
        reason: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Withdraw approval from an approved diary
    Revoke {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Approve a previously rejected diary
    ReReview {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    Delete {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    /// Which stored session this command runs under.
    pub fn slot(&self) -> SessionSlot {
        match self {
            Commands::Admin(_) => SessionSlot::Admin,
            _ => SessionSlot::User,
        }
    }

    /// A rejected login says nothing about the stored session.
    pub fn is_login(&self) -> bool {
        matches!(
            self,
            Commands::Login { .. } | Commands::Admin(AdminCommands::Login { .. })
        )
    }
}
