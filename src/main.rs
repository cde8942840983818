//! genie-bridge CLI binary entry point.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use genie_bridge::bridge::{build_genie_client, ChatBridge};
use genie_bridge::cli::{Cli, Commands, QueryArgs};
use genie_bridge::config::BridgeConfig;
use genie_bridge::result::{normalize, NormalizedAnswer, QueryResult};
use genie_bridge::runtime::BackgroundExecutor;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let result = BridgeConfig::from_env().and_then(|config| match cli.command {
        Commands::Ask(args) => {
            let bridge = ChatBridge::connect(config)?;
            print_answer(&bridge.submit(&args.question));
            Ok(())
        }
        Commands::Chat => handle_chat(config),
        Commands::Query(args) => handle_query(config, args),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        eprintln!("Hint: {:?}", e.recovery_suggestion());
        std::process::exit(1);
    }
}

fn handle_chat(config: BridgeConfig) -> genie_bridge::error::Result<()> {
    let bridge = ChatBridge::connect(config)?;
    eprintln!(
        "Connected (thread {}). Type a question, or `exit` to quit.",
        bridge.session().thread_id
    );

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if matches!(question, "exit" | "quit") {
            break;
        }
        if question.is_empty() {
            continue;
        }
        print_answer(&bridge.submit(question));
    }
    Ok(())
}

fn handle_query(config: BridgeConfig, args: QueryArgs) -> genie_bridge::error::Result<()> {
    let client = Arc::new(build_genie_client(&config)?);
    let executor = BackgroundExecutor::new()?;
    let QueryArgs {
        question,
        conversation_id,
    } = args;

    let outcome =
        executor.block_on(async move { client.query(&question, conversation_id).await })?;
    if let QueryResult::Error { message } = &outcome.result {
        eprintln!("Backend error: {message}");
    }
    print!("{}", normalize(&outcome.result));
    if let Some(id) = outcome.conversation_id {
        eprintln!("conversation_id: {id}");
    }
    Ok(())
}

fn print_answer(answer: &NormalizedAnswer) {
    println!("{}", answer.markdown_text);
    if let Some(path) = &answer.image_path {
        eprintln!("Image saved to {}", path.display());
    }
}
