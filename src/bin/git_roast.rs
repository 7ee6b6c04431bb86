//! git-roast: terminal front-end for the roast service.
//!
//! Usage:
//!   git-roast https://github.com/owner/repo      # roast once
//!   git-roast --json https://github.com/a/b      # print the final state as JSON
//!   git-roast                                    # interactive prompt
//!   git-roast --json                             # interactive, one JSON line per outcome

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use git_roast::render::{JsonRenderer, TerminalRenderer, PROMPT};
use git_roast::{
    ClientConfig, CueNotifier, HttpRoastService, InteractionState, NoopNotifier, RejectReason,
    RoastController, SubmitOutcome,
};
use git_roast::cue::TerminalBell;

#[derive(Parser, Debug)]
#[command(name = "git-roast", version, about = "Submit a GitHub repository for a roasting")]
struct Args {
    /// Repository URL to roast. Omit for an interactive prompt.
    repo_url: Option<String>,

    /// Base URL of the roast service
    #[arg(long, env = "PUBLIC_API_URL")]
    api_url: Option<String>,

    /// Print each final state as a JSON line instead of the report
    #[arg(long)]
    json: bool,

    /// Do not ring the terminal bell
    #[arg(long)]
    silent: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,git_roast=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Before parsing, so a `.env` file can supply PUBLIC_API_URL.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = match &args.api_url {
        Some(url) => ClientConfig::new(url)?,
        None => ClientConfig::default(),
    };
    let service = HttpRoastService::new(&config).context("Failed to create HTTP client")?;
    let notifier: Arc<dyn CueNotifier> = if args.silent {
        Arc::new(NoopNotifier)
    } else {
        Arc::new(TerminalBell)
    };
    let controller = RoastController::new(Arc::new(service)).with_notifier(notifier);

    if args.json {
        controller.subscribe(Arc::new(JsonRenderer));
    } else {
        controller.subscribe(Arc::new(TerminalRenderer));
    }

    match args.repo_url {
        Some(url) => roast_once(&controller, &url).await,
        None => interactive(&controller).await.map(|()| ExitCode::SUCCESS),
    }
}

async fn roast_once(controller: &RoastController, repo_url: &str) -> anyhow::Result<ExitCode> {
    let state = match controller.submit(repo_url).await {
        SubmitOutcome::Completed(state) => state,
        SubmitOutcome::Rejected(RejectReason::EmptyUrl) => {
            eprintln!("enter_github_repo_url...");
            return Ok(ExitCode::FAILURE);
        }
        SubmitOutcome::Rejected(RejectReason::InFlight) => return Ok(ExitCode::FAILURE),
    };

    Ok(match state {
        InteractionState::ShowingResult(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn interactive(controller: &RoastController) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    eprintln!("INITIATE_DESTRUCTION: paste a GitHub URL, `reset` to clear, `exit` to leave.");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        match input {
            "exit" | "quit" => break,
            "reset" | "clear" => {
                controller.reset();
            }
            _ => {
                if !input.is_empty() {
                    let _ = editor.add_history_entry(input);
                }
                controller.submit(input).await;
            }
        }
    }

    Ok(())
}
