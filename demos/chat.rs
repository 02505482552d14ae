//! Interactive chat session against a local backend.
//!
//! Demonstrates:
//! - Spawning a client from a JSON settings blob
//! - Observing status events on a channel
//! - Submitting stdin lines as messages
//! - Retrying a message that was reported as failed
//!
//! Usage:
//!   cargo run --example chat
//!   cargo run --example chat -- --debug
//!   cargo run --example chat -- --url ws://127.0.0.1:9000

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use rubberduck_link::{Client, ClientConfig, OutboundMessage, StatusEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const SETTINGS: &str = r#"{
    "service": "chat",
    "reconnectDelayMs": 5000,
    "resendDelayMs": 1000,
    "maxResendAttempts": 2
}"#;

// ============================================================================
// Args
// ============================================================================

struct Args {
    debug: bool,
    url: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let url = args
            .iter()
            .position(|a| a == "--url")
            .and_then(|i| args.get(i + 1))
            .cloned();
        Self {
            debug: args.iter().any(|a| a == "--debug"),
            url,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "rubberduck_link=debug"
    } else {
        "rubberduck_link=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    println!("=== Rubberduck chat ===\n");

    let mut config = ClientConfig::from_json(SETTINGS).context("parsing settings")?;
    if let Some(url) = args.url {
        config = config.with_url(url);
    }

    let client = Client::spawn(config).context("spawning client")?;
    println!("[Setup] Endpoint: {}", client.url());

    let mut events = client.subscribe();
    client.connect()?;

    let last_failed: Arc<Mutex<Option<OutboundMessage>>> = Arc::default();
    let printer = {
        let last_failed = Arc::clone(&last_failed);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    StatusEvent::Connection { connected } => {
                        println!("[status] connected: {connected}");
                    }
                    StatusEvent::SendSuccess { text } => println!("[sent] {text}"),
                    StatusEvent::Retrying {
                        attempt,
                        max_attempts,
                        ..
                    } => println!("[retry] attempt {attempt}/{max_attempts} failed"),
                    StatusEvent::SendFailed { message } => {
                        println!("[failed] {} (type /retry to resend)", message.text);
                        *last_failed.lock() = Some(message);
                    }
                    StatusEvent::ReceiveMessage { kind, text, .. } => {
                        println!("[{kind:?}] {text}");
                    }
                    other => println!("[event] {other:?}"),
                }
            }
        })
    };

    println!("Type a message and press Enter. /retry resends the last failure, /quit exits.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/retry" => match last_failed.lock().take() {
                Some(message) => client.retry(message)?,
                None => println!("Nothing to retry"),
            },
            "" => {}
            text => client.submit(OutboundMessage::new(text))?,
        }
    }

    client.close().await?;
    printer.abort();
    println!("\n=== Done ===");
    Ok(())
}
