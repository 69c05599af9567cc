use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "omnicode", version, about = "AI-assisted completion, refactoring and docs")]
pub struct Cli {
    /// Log more detail (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and confirm it with the emailed code
    Register {
        #[arg(long)]
        email: String,
        /// Verification code; prompted for when omitted
        #[arg(long)]
        code: Option<String>,
    },
    /// Confirm an account registered earlier
    Confirm {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Print the signed-in user id
    Whoami,
    /// Suggest a completion for one line of a file
    Complete {
        #[arg(long)]
        file: PathBuf,
        /// 1-based line number
        #[arg(long)]
        line: usize,
        #[arg(long)]
        language: Option<String>,
    },
    /// Refactor a file or a line range of it
    Refactor {
        #[arg(long)]
        file: PathBuf,
        /// 1-based inclusive range, e.g. `3:10`
        #[arg(long)]
        lines: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Generate a doc comment for a file or a line range of it
    Doc {
        #[arg(long)]
        file: PathBuf,
        /// 1-based inclusive range, e.g. `3:10`
        #[arg(long)]
        lines: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Mark the last completion as accepted
    Accept {
        /// Bytes of text the accepted suggestion produced
        #[arg(long)]
        bytes: u64,
    },
    /// Mark the last completion as rejected
    Reject,
    /// Show usage statistics
    Dashboard {
        /// Print the raw summary as JSON
        #[arg(long)]
        json: bool,
        /// Also write a standalone HTML page with both charts
        #[arg(long)]
        html: Option<PathBuf>,
        /// Summarize locally recorded usage instead of fetching
        #[arg(long)]
        local: bool,
    },
    /// Check a password against the policy (read from stdin)
    CheckPassword,
    /// Print version
    Version,
}
