//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "harness-admin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to load instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Owner account (overrides config)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Host state document (overrides config)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Audit journal (overrides config)
    #[arg(long, global = true)]
    pub journal: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grant or revoke harness admin status (owner only)
    Configure {
        /// Account to configure
        account: String,

        /// New status
        #[arg(action = clap::ArgAction::Set)]
        status: bool,

        /// Account performing the call (defaults to the owner)
        #[arg(long)]
        caller: Option<String>,
    },
    /// Print whether an account is a harness admin
    Check {
        account: String,

        /// Exit with an error when the account is not permitted
        #[arg(long)]
        require: bool,
    },
    /// List current harness admins
    List,
    /// Print the audit journal
    History,
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
    /// Print the effective configuration
    Show,
}
