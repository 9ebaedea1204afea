//! tutor-watch: trigger content generation and follow it until it settles.

use std::collections::HashSet;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use tutor_poller::{
    ClientConfig, GenerationPoller, HttpGenerationClient, PollerConfig, PollerEvent, SubjectState,
};

#[derive(Parser)]
#[command(name = "tutor-watch")]
#[command(author, version, about = "Start subject content generation and watch its progress")]
struct Cli {
    /// User whose subjects are generated
    #[arg(short, long)]
    user: String,

    /// Single subject to generate (default: all subjects of the user)
    #[arg(short, long)]
    subject: Option<String>,

    /// Base URL of the tutoring API
    #[arg(long, env = "TUTOR_API_URL", default_value = tutor_core::defaults::API_URL)]
    api_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "TUTOR_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Delete the subject's generated content before starting
    #[arg(long, requires = "subject")]
    reset: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every watched subject completed.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let user_id = tutor_core::parse_user_id(&cli.user)?;
    let subject_id = cli
        .subject
        .as_deref()
        .map(tutor_core::parse_subject_id)
        .transpose()?;

    let mut client_config = ClientConfig::new(cli.api_url);
    if let Some(token) = cli.token.filter(|t| !t.trim().is_empty()) {
        client_config = client_config.with_token(token);
    }
    let client = HttpGenerationClient::new(client_config).context("building HTTP client")?;

    let poller = GenerationPoller::new(Arc::new(client), user_id, PollerConfig::from_env());
    let mut events = poller.events();

    let mut pending: HashSet<i64> = match subject_id {
        Some(subject_id) => {
            if cli.reset {
                poller
                    .reset(subject_id)
                    .await
                    .with_context(|| format!("resetting subject {}", subject_id))?;
                println!("subject {}: reset", subject_id);
            }
            poller
                .start(subject_id)
                .await
                .with_context(|| format!("starting subject {}", subject_id))?;
            HashSet::from([subject_id])
        }
        None => poller
            .start_all()
            .await
            .context("starting generation for all subjects")?
            .into_iter()
            .collect(),
    };

    if pending.is_empty() {
        println!("nothing to generate");
        return Ok(true);
    }

    let mut all_completed = true;
    while !pending.is_empty() {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event stream lagged, reading subject views");
                let waiting: Vec<i64> = pending.iter().copied().collect();
                for view in poller.settled(&waiting).await {
                    if view.state != SubjectState::Completed {
                        all_completed = false;
                    }
                    println!("subject {}: {:?}", view.subject_id, view.state);
                    pending.remove(&view.subject_id);
                }
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match &event {
            PollerEvent::Requested { subject_id } => {
                println!("subject {}: requested", subject_id);
            }
            PollerEvent::Progress { subject_id, status } => {
                println!(
                    "subject {}: {} (chapters: {}, topics: {})",
                    subject_id, status.status, status.chapters_generated, status.topics_generated
                );
            }
            PollerEvent::Completed { subject_id, .. } => {
                println!("subject {}: completed", subject_id);
            }
            PollerEvent::Failed { subject_id, reason } => {
                all_completed = false;
                println!("subject {}: failed ({:?})", subject_id, reason);
            }
            PollerEvent::Reset { subject_id } => {
                println!("subject {}: reset", subject_id);
            }
        }

        if event.is_terminal() {
            pending.remove(&event.subject_id());
        }
    }

    Ok(all_completed)
}
