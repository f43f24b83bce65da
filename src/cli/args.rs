//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Transport;

#[derive(Parser, Debug)]
#[command(name = "vexa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Model to use (e.g., gpt-4o-mini, llama3.2)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Persona (system prompt) for a fresh conversation
    #[arg(short, long, global = true)]
    pub system: Option<String>,

    /// How to reach the assistant: http, websocket or mock
    #[arg(short, long, global = true)]
    pub transport: Option<Transport>,

    /// Directory holding the conversation and the log file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep the conversation in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one prompt and stream the reply to stdout
    Ask {
        /// The message to send
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Inspect or reset the stored conversation
    Memory {
        #[command(subcommand)]
        command: MemorySubcommands,
    },
    /// Read text aloud with the configured synthesizer
    Speak {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum MemorySubcommands {
    /// Print the stored conversation
    Show {
        /// Print the raw JSON instead of a transcript
        #[arg(long)]
        json: bool,
    },
    /// Reset the conversation to the persona only
    Clear,
    /// Print where the conversation is stored
    Path,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
}
