//! CLI entry point for genie-bridge.

use clap::{Parser, Subcommand};

/// Ask questions about your data through a hosted agent.
#[derive(Parser, Debug)]
#[command(name = "genie-bridge", version, about = "Conversational data Q&A bridge")]
pub struct Cli {
    /// Log more (repeat for debug output). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the agent one question
    Ask(AskArgs),
    /// Interactive session over stdin
    Chat,
    /// Query the data backend directly, bypassing the agent
    Query(QueryArgs),
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Question text
    pub question: String,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Question text
    pub question: String,

    /// Continue an existing backend conversation
    #[arg(short, long)]
    pub conversation_id: Option<String>,
}

impl Cli {
    /// Default log filter for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info,genie_bridge=info",
            _ => "info,genie_bridge=debug",
        }
    }
}
