//! tabsh — drive an interactive command-line tool through a managed session.
//!
//! Wraps a line-driven tool (SQL*Plus by default) the way the editor plugin
//! does: input lines go to the child, output lines come back tagged by
//! stream, and recognized status markers update a connection indicator.

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use std::time::Duration;
use tabsh_core::{HistoryDirection, OutputStream, SessionEvent, TabId, TabshError};
use tabsh_engine::session::completion;
use tabsh_engine::SessionManager;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// The single tab driven by this CLI.
const TAB: TabId = 0;

/// Prefix marking stderr lines in the transcript.
const STDERR_PREFIX: &str = "STDERROR=> ";

/// tabsh — Tab Shell CLI
#[derive(Parser)]
#[command(
    name = "tabsh",
    version,
    about = "Tab Shell — managed interactive subprocess sessions"
)]
struct Cli {
    /// Executable to wrap (overrides config)
    #[arg(short, long, global = true)]
    executable: Option<String>,

    /// Working directory for the child (overrides config)
    #[arg(short, long, global = true)]
    workdir: Option<String>,

    /// Config file path
    #[arg(long, global = true, default_value = "~/.tabsh/config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print filename completions for a partial token and exit
    Complete {
        /// Partial filename to complete
        partial: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    use tracing_subscriber::EnvFilter;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(&cli.config)?;
    let spawn_config = config.to_spawn_config(cli.executable.as_deref(), cli.workdir.as_deref());
    let workdir = spawn_config.workdir.clone();
    let (manager, mut events) = SessionManager::new(spawn_config);

    if let Some(Command::Complete { partial }) = &cli.command {
        // Candidates with the `usage:` hint from the script head, if any.
        for name in manager.request_completion(TAB, partial).await {
            match completion::usage_hint(&workdir.join(&name)) {
                Some(hint) => println!("{name}\t{hint}"),
                None => println!("{name}"),
            }
        }
        return Ok(());
    }

    // Print session events as they arrive.
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::OutputLine { line, .. } => match line.stream {
                    OutputStream::Stdout => println!("{}", line.text),
                    OutputStream::Stderr => println!("{STDERR_PREFIX}{}", line.text),
                },
                SessionEvent::ConnectionStatusChanged { status, .. } => {
                    eprintln!("[connected: {status}]");
                }
                SessionEvent::SessionClosed { reason, .. } => {
                    eprintln!("[session closed: {reason:?}]");
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            maybe = lines.next_line() => match maybe {
                Ok(Some(line)) => {
                    if let Err(e) = handle_line(&manager, &line).await {
                        match e {
                            TabshError::WriteTimeout => {
                                eprintln!("[input write timed out, try again]");
                            }
                            other => {
                                eprintln!("[{other}]");
                                break;
                            }
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    eprintln!("[stdin error: {e}]");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
        }
    }

    manager.shutdown().await;
    drop(manager);
    // Let the close event reach the transcript before exiting.
    let _ = tokio::time::timeout(Duration::from_secs(2), printer).await;
    Ok(())
}

/// Route one input line: `:prev` / `:next` recall history, everything else
/// goes to the child.
async fn handle_line(manager: &SessionManager, line: &str) -> Result<(), TabshError> {
    match line.trim_end() {
        ":prev" => recall(manager, HistoryDirection::Previous).await,
        ":next" => recall(manager, HistoryDirection::Next).await,
        _ => manager.submit(TAB, line).await,
    }
}

async fn recall(manager: &SessionManager, direction: HistoryDirection) -> Result<(), TabshError> {
    match manager.navigate_history(TAB, direction, "").await {
        Ok(text) => {
            eprintln!("[history] {text}");
            Ok(())
        }
        Err(TabshError::SessionNotFound(_)) => {
            eprintln!("[history] (no session yet)");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
