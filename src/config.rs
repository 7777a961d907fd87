//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{services::JsonFileStore, state::Mode};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "pomodoro")]
#[command(about = "A Pomodoro timer daemon with a message API and terminal popup")]
#[command(version)]
pub struct Config {
    /// Port the daemon listens on (or the client connects to)
    #[arg(short, long, default_value = "20554", global = true)]
    pub port: u16,

    /// Host address to bind to (or connect to)
    #[arg(long, default_value = "127.0.0.1", global = true)]
    pub host: String,

    /// Where the timer state is persisted
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Send completion notifications through notify-send
    #[arg(long)]
    pub desktop_notifications: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Daemon or popup client actions
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Run the timer daemon (default)
    Serve,
    /// Show the current timer
    Status,
    /// Start or resume the timer
    Start {
        /// Task to focus on (keeps the current one when omitted)
        #[arg(short, long)]
        task: Option<String>,
    },
    /// Pause the timer
    Pause,
    /// Stop and rewind to a full focus interval
    Reset,
    /// Rename the current task
    Task { name: String },
    /// Switch preset (25-5 or 50-10)
    Mode { mode: Mode },
    /// Turn notification sound on or off (also starts the timer)
    Sound {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Follow timer updates live
    Watch,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL clients use to reach the daemon
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address())
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(JsonFileStore::default_path)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
