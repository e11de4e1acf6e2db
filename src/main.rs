use std::io::{self, BufRead, IsTerminal, Write};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{select, unbounded, Receiver};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::prelude::*;

use plume_client::{ChatClient, ClientConfig, ConnectionManager, ConnectionState, TerminalSink, WsConnector};

#[derive(Parser)]
#[command(name = "plume")]
#[command(about = "Terminal client for a Plume chat server")]
struct Cli {
    /// Server host and port
    #[arg(long, default_value = plume_client::config::DEFAULT_HOST)]
    host: String,

    /// Connect with wss:// instead of ws://
    #[arg(long)]
    secure: bool,

    /// Name to join with (skips the name prompt)
    #[arg(long)]
    name: Option<String>,

    /// Email to join with (skips the email prompt)
    #[arg(long)]
    email: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Where the next typed line goes.
enum Prompt {
    Name,
    Email { name: String },
    Message,
}

fn init_logging(debug: bool) {
    let default_directive = if debug {
        "plume_client=debug,plume=debug,info"
    } else {
        "plume_client=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
        // dropping tx signals EOF to the main loop
    });
    rx
}

fn prompt(label: &str) {
    print!("{label}: ");
    let _ = io::stdout().flush();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = ClientConfig::new(cli.host, cli.secure);
    let endpoint = config.endpoint().context("invalid server address")?;
    info!(%endpoint, "starting plume client");

    let runtime = Runtime::new().context("failed to create tokio runtime")?;
    let connector = WsConnector::new(endpoint, runtime.handle().clone());
    let sink = TerminalSink::new(io::stdout(), io::stdout().is_terminal());
    let mut client = ChatClient::new(ConnectionManager::new(connector), sink);

    let events = client.events();
    let lines = spawn_stdin_reader();

    let mut next = match (cli.name, cli.email) {
        (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
            client.submit_join(&name, &email);
            Prompt::Message
        }
        (Some(name), _) if !name.is_empty() => {
            prompt("email");
            Prompt::Email { name }
        }
        _ => {
            prompt("name");
            Prompt::Name
        }
    };

    loop {
        select! {
            recv(events) -> event => {
                if let Ok(event) = event {
                    client.handle_event(event);
                }
                if matches!(next, Prompt::Message) && client.state() == ConnectionState::Disconnected {
                    prompt("name");
                    next = Prompt::Name;
                }
            }
            recv(lines) -> line => {
                let Ok(mut line) = line else {
                    client.leave();
                    break;
                };
                if line.trim() == "/quit" {
                    client.leave();
                    break;
                }

                next = match next {
                    Prompt::Name if line.is_empty() => {
                        prompt("name");
                        Prompt::Name
                    }
                    Prompt::Name => {
                        prompt("email");
                        Prompt::Email { name: line }
                    }
                    Prompt::Email { name } if line.is_empty() => {
                        prompt("email");
                        Prompt::Email { name }
                    }
                    Prompt::Email { name } => {
                        client.submit_join(&name, &line);
                        Prompt::Message
                    }
                    Prompt::Message if line.trim() == "/leave" => {
                        client.leave();
                        prompt("name");
                        Prompt::Name
                    }
                    Prompt::Message => {
                        client.submit_message(&mut line);
                        Prompt::Message
                    }
                };
            }
        }
    }

    info!("bye");
    // give the close frame a moment to go out
    runtime.shutdown_timeout(std::time::Duration::from_millis(250));
    Ok(())
}
