//! Command-line interface for nexus_arcade.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nexus_arcade::StatField;

/// Nexus Arcade - casual games with persistent player stats
#[derive(Parser, Debug)]
#[command(name = "nexus_arcade")]
#[command(about = "Casual arcade games with persistent player stats", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the top players by a stat
    Leaderboard {
        /// Stat to rank by (wins, losses, matches, win_rate, reaction, xp)
        #[arg(long, default_value = "wins")]
        by: StatField,

        /// Number of entries (defaults to the configured size)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Sign in and print a player's record
    Profile {
        /// Display name to sign in as
        #[arg(long)]
        name: String,
    },

    /// Play reaction rounds: press Enter when the lights go out
    Reaction {
        /// Display name to record results under
        #[arg(long)]
        name: Option<String>,

        /// Seed for the arm delay (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Play a memory game by entering card numbers
    Memory {
        /// Display name to record results under
        #[arg(long)]
        name: Option<String>,

        /// Seed for the deal (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Pairs to deal from the full grid (classic grid when omitted)
        #[arg(long)]
        pairs: Option<usize>,
    },

    /// Play hot-seat tic-tac-toe
    Tictactoe,
}
