use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convo")]
#[command(author, version, about = "Manage saved agent conversation sessions", long_about = None)]
pub struct Cli {
    /// Session directory (overrides configuration)
    #[arg(long, global = true)]
    pub session_dir: Option<PathBuf>,

    /// Maximum number of sessions kept after a save (overrides configuration)
    #[arg(long, global = true)]
    pub max_sessions: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List saved sessions, most recent first
    List,

    /// Show a session's metadata and messages
    Show { id: String },

    /// Save a JSON array of messages as a session
    Save {
        /// File containing `[{"role": "...", "content": "..."}, ...]`
        file: PathBuf,

        /// Re-save under an existing session id
        #[arg(long)]
        id: Option<String>,

        #[arg(short = 'n', long)]
        name: Option<String>,

        #[arg(short = 'd', long)]
        description: Option<String>,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        model: Option<String>,
    },

    /// Delete a session
    Delete { id: String },

    /// Delete all but the most recent sessions
    Purge {
        /// Number of sessions to keep (default: configured maximum)
        #[arg(short, long)]
        keep: Option<usize>,
    },

    /// Print the id of the most recently saved session
    Last,

    /// Print the resume summary of a session (default: the last one)
    Resume { id: Option<String> },

    /// Rebuild the index from the session files
    Reindex,
}
