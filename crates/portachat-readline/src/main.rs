mod export;
mod logging;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc::UnboundedReceiver;

use portachat_core::credential::{CredentialError, CredentialStore};
use portachat_core::session::{
    MessageKind, MessageRole, SessionController, SessionEvent, SubmitOutcome,
};
use portachat_infrastructure::{ConfigService, FileCredentialStore, PortachatPaths};
use portachat_interaction::OpenAiCompletionService;

/// How often the "thinking" indicator repeats while a request is in flight.
const INDICATOR_INTERVAL: Duration = Duration::from_millis(1500);

const COMMANDS: [&str; 4] = ["/key", "/status", "/export", "/help"];

/// Chat with a hosted language model from the terminal.
#[derive(Parser, Debug)]
#[command(name = "portachat", version, about)]
struct Args {
    /// Directory holding config.toml, secret.json and logs
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Model to use instead of the configured one
    #[arg(long)]
    model: Option<String>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// The main entry point for the Portachat REPL.
///
/// Wires the file-backed credential store and the OpenAI backend into a
/// session controller, checks the credential, then reads prompts and slash
/// commands until `quit`.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let base = args.config_dir.as_deref();

    // ===== Configuration & logging =====
    let paths = PortachatPaths::new(base);
    let config_service = ConfigService::new(base)?;
    let config = config_service
        .get_config()?
        .with_env_overrides()
        .with_model_override(args.model);
    let _log_guard = logging::init(&paths, &config.log_level)?;
    tracing::info!(
        "[Bootstrap] Config loaded from {} (model: {})",
        config_service.path().display(),
        config.model
    );

    // ===== Session wiring =====
    let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(base)?);
    let completion = Arc::new(OpenAiCompletionService::new(store.clone(), &config)?);
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    let session = Arc::new(SessionController::new(store, completion).with_event_sender(event_tx));

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Portachat ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Model: {}. Type /help for commands or 'quit' to exit.", config.model)
            .bright_black()
    );
    println!();

    session.initialize().await;

    // ===== Main REPL Loop =====
    loop {
        print_events(&session, &mut event_rx).await;

        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                if let Some(command) = trimmed.strip_prefix('/') {
                    run_command(command, &session, &mut rl, &config.model).await;
                    continue;
                }

                let _ = rl.add_history_entry(&line);
                submit_with_indicator(&session, trimmed).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

/// Submits a prompt and prints a "thinking" line while it is in flight.
async fn submit_with_indicator(session: &Arc<SessionController>, prompt: &str) {
    let mut request = {
        let session = Arc::clone(session);
        let prompt = prompt.to_string();
        tokio::spawn(async move { session.submit(&prompt).await })
    };

    let mut ticker = tokio::time::interval(INDICATOR_INTERVAL);
    loop {
        tokio::select! {
            result = &mut request => {
                match result {
                    Ok(SubmitOutcome::IgnoredBusy) => {
                        println!("{}", "A request is already in flight.".yellow());
                    }
                    Ok(_) => {}
                    Err(e) => eprintln!("{}", format!("Request task failed: {e}").red()),
                }
                break;
            }
            _ = ticker.tick() => {
                if let Some(pending) = session.pending_text().await {
                    println!("{}", format!("… thinking about \"{}\"", preview(&pending)).bright_black());
                }
            }
        }
    }
}

/// Prints everything the session published since the last call.
async fn print_events(session: &SessionController, events: &mut UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::MessageAppended {
                index,
                role: MessageRole::Assistant,
            } => {
                let transcript = session.transcript().await;
                let Some(message) = transcript.get(index) else {
                    continue;
                };
                for line in message.content().lines() {
                    let line = match message.kind() {
                        MessageKind::Turn => line.bright_blue(),
                        MessageKind::Advisory => line.yellow(),
                        MessageKind::Error => line.red(),
                    };
                    println!("{}", line);
                }
                println!();
            }
            SessionEvent::CredentialPromptRequested => {
                println!("{}", "Use /key to enter your API key.".bright_yellow());
            }
            SessionEvent::CredentialStatusChanged { status } => {
                tracing::debug!("[REPL] Credential status: {:?}", status);
            }
            SessionEvent::MessageAppended { .. } | SessionEvent::BusyChanged { .. } => {}
        }
    }
}

async fn run_command(
    command: &str,
    session: &SessionController,
    rl: &mut Editor<CliHelper, DefaultHistory>,
    model: &str,
) {
    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "key" => edit_key(session, rl).await,
        "status" => {
            let status = session.credential_status().await;
            println!("{}", status.describe().bright_white());
            println!(
                "{}",
                format!(
                    "Model: {model} | messages: {} | busy: {}",
                    session.transcript_len().await,
                    session.is_busy().await
                )
                .bright_black()
            );
        }
        "export" => {
            if argument.is_empty() {
                println!("{}", "Usage: /export <file>".yellow());
                return;
            }
            match export_transcript(session, argument).await {
                Ok(path) => println!("{}", format!("Transcript written to {path}").green()),
                Err(e) => eprintln!("{}", format!("Export failed: {e:#}").red()),
            }
        }
        "help" => print_help(),
        _ => println!("{}", "Unknown command".bright_black()),
    }
}

/// Lets the user edit the stored key in place, then saves it.
async fn edit_key(session: &SessionController, rl: &mut Editor<CliHelper, DefaultHistory>) {
    let current = match session.load_credential_for_display().await {
        Ok(value) => value,
        Err(CredentialError::NotConfigured) => String::new(),
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            String::new()
        }
    };

    let entered = match rl.readline_with_initial("API key: ", (&current, "")) {
        Ok(entered) => entered,
        Err(_) => {
            println!("{}", "Cancelled.".bright_black());
            return;
        }
    };

    match session.save_credential(&entered).await {
        Ok(_) => println!("{}", "API key saved.".green()),
        Err(CredentialError::Validation) => {
            println!("{}", CredentialError::Validation.to_string().yellow())
        }
        Err(e) => eprintln!("{}", format!("Failed to save the API key: {e}").red()),
    }
}

async fn export_transcript(session: &SessionController, target: &str) -> Result<String> {
    let rendered = session.rendered_transcript().await;
    let fragment = export::transcript_fragment(&rendered);
    std::fs::write(target, fragment).with_context(|| format!("Failed to write {target}"))?;
    Ok(target.to_string())
}

fn print_help() {
    println!("{}", "Commands:".bright_white());
    println!("  {}  edit and save the API key", "/key".bright_cyan());
    println!("  {}  show credential and session state", "/status".bright_cyan());
    println!("  {}  write the rendered transcript as HTML", "/export <file>".bright_cyan());
    println!("  {}  show this list", "/help".bright_cyan());
    println!("  {}  exit", "quit, exit".bright_cyan());
}

/// Shortens `text` to one line for the indicator.
fn preview(text: &str) -> String {
    const LIMIT: usize = 40;
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > LIMIT || text.lines().nth(1).is_some() {
        let short: String = first_line.chars().take(LIMIT).collect();
        format!("{short}…")
    } else {
        first_line.to_string()
    }
}
