//! genie-bridge: ask a hosted LLM agent questions about your data.
//!
//! The agent answers database questions by calling a single tool,
//! `askDatabaseQuestions`, which forwards the question to a natural-language
//! data Q&A backend, waits for the answer and renders it as markdown. The
//! agent relays that markdown verbatim; images it produces are saved locally.
//!
//! # Quick Start
//!
//! ```no_run
//! use genie_bridge::prelude::*;
//!
//! # fn example() -> genie_bridge::error::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let bridge = ChatBridge::connect(config)?;
//! let answer = bridge.submit("What were total sales last quarter?");
//! println!("{}", answer.markdown_text);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod bridge;
pub mod config;
pub mod error;
pub mod genie;
pub mod http;
pub mod prelude;
pub mod result;
pub mod runtime;
pub mod tools;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
