use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reaction-time aim duels against rated bots")]
pub struct Cli {
    /// Database URL (overrides AIM_DATABASE_URL)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// RNG seed for reproducible opponents and bot reactions
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Play one ranked match
    Play,
    /// Endless practice targets, no rating change
    Practice,
    /// Show the leaderboard with your position
    Leaderboard,
    /// Show your profile, or a bot's
    Profile {
        /// Bot name from the leaderboard
        name: Option<String>,
    },
    /// Write an encrypted backup of rating and leaderboard
    Backup {
        path: PathBuf,
        #[arg(long, env = "AIM_BACKUP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Restore an encrypted backup
    Restore {
        path: PathBuf,
        #[arg(long, env = "AIM_BACKUP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Run the leaderboard drift timer in the foreground
    Drift {
        /// Apply a single tick and exit
        #[arg(long)]
        once: bool,
    },
}
