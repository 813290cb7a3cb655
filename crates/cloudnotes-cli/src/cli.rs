use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cloudnotes_core::AccessLevel;

#[derive(Parser)]
#[command(name = "cloudnotes")]
#[command(about = "Notes and images backed by a managed cloud backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend config file (JSON). Falls back to the default config path, then the environment
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the backend to settle
    #[arg(long, global = true, value_name = "SECS", default_value = "10")]
    pub wait: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show sign-in status
    Status,
    /// Print every UI model change until interrupted
    Watch,
    /// Sign in with email and password
    SignIn {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out and clear the stored session
    SignOut,
    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// Manage stored images
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
}

#[derive(Subcommand)]
pub enum NotesCommands {
    /// List notes of the signed-in user
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a note
    #[command(alias = "new")]
    Add {
        /// Note name
        name: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
        /// Object key of an attached image
        #[arg(long, value_name = "KEY")]
        image: Option<String>,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Upload a file
    Put {
        /// Object key
        key: String,
        /// File to upload
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = AccessArg::Private)]
        access: AccessArg,
    },
    /// Download an object
    Get {
        /// Object key
        key: String,
        /// Output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = AccessArg::Private)]
        access: AccessArg,
    },
    /// Delete an object
    Rm {
        /// Object key
        key: String,
        #[arg(long, value_enum, default_value_t = AccessArg::Private)]
        access: AccessArg,
    },
}

/// Object visibility as accepted on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum AccessArg {
    #[value(alias = "public")]
    Guest,
    Protected,
    Private,
}

impl From<AccessArg> for AccessLevel {
    fn from(value: AccessArg) -> Self {
        match value {
            AccessArg::Guest => Self::Guest,
            AccessArg::Protected => Self::Protected,
            AccessArg::Private => Self::Private,
        }
    }
}
