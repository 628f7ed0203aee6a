use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{Mutex, RwLock};

use super::event::SessionEvent;
use super::message::{Message, RenderedMessage};
use super::state::SessionState;
use super::transcript::Transcript;
use crate::completion::{CompletionError, CompletionService};
use crate::credential::{CredentialError, CredentialGate, CredentialStatus, CredentialStore};
use crate::render::RenderPipeline;

/// Advisory shown at startup when no API key is stored.
pub const CREDENTIAL_SETUP_ADVISORY: &str = "Welcome! No API key is configured yet. \
Open the settings and save your OpenAI API key to start chatting.";

/// Reply shown in place of an answer when a request fails for lack of an API key.
pub const CREDENTIAL_MISSING_REPLY: &str = "Error: No API key is configured. \
Open the settings, save your API key and send your message again.";

/// Prefix for every other request failure shown in the transcript.
pub const REQUEST_FAILURE_PREFIX: &str = "Error: ";

/// What a call to [`SessionController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The input was blank after trimming; nothing changed.
    IgnoredBlank,
    /// A request was already in flight; nothing changed.
    IgnoredBusy,
    /// The reply was appended at `index`.
    Replied { index: usize },
    /// The request failed and an error entry was appended at `index`.
    Failed { index: usize, error: CompletionError },
}

/// Orchestrates one chat session.
///
/// `SessionController` is responsible for:
/// - Gating submissions so at most one completion request is in flight
/// - Appending user prompts, replies and error surrogates to the transcript
/// - Driving the credential gate at startup and on behalf of the UI
/// - Publishing [`SessionEvent`]s for the presentation layer
pub struct SessionController {
    journal: Journal,
    /// Guards the busy check-and-set together with the user-message append.
    state: Arc<Mutex<SessionState>>,
    gate: CredentialGate,
    completion: Arc<dyn CompletionService>,
    renderer: RenderPipeline,
    initialized: AtomicBool,
}

/// Transcript plus event sender, shared with the request task.
#[derive(Clone)]
struct Journal {
    transcript: Arc<RwLock<Transcript>>,
    events: Option<UnboundedSender<SessionEvent>>,
}

impl Journal {
    async fn append(&self, message: Message) -> usize {
        let role = message.role();
        let index = self.transcript.write().await.append(message);
        self.emit(SessionEvent::MessageAppended { index, role });
        index
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            // A closed receiver only means nobody is listening anymore
            let _ = sender.send(event);
        }
    }

    /// Records the outcome of the request in flight and returns to idle.
    async fn conclude(
        &self,
        state: &Mutex<SessionState>,
        result: Result<String, CompletionError>,
    ) -> SubmitOutcome {
        let outcome = match result {
            Ok(reply) => {
                let index = self.append(Message::assistant(reply)).await;
                SubmitOutcome::Replied { index }
            }
            Err(error) => {
                tracing::warn!("[Session] Completion failed: {}", error);
                let index = self.append(Message::error(failure_text(&error))).await;
                SubmitOutcome::Failed { index, error }
            }
        };

        state.lock().await.finish();
        self.emit(SessionEvent::BusyChanged { busy: false });
        outcome
    }
}

impl SessionController {
    /// Creates a controller over a credential store and a completion backend.
    pub fn new(store: Arc<dyn CredentialStore>, completion: Arc<dyn CompletionService>) -> Self {
        Self {
            journal: Journal {
                transcript: Arc::new(RwLock::new(Transcript::new())),
                events: None,
            },
            state: Arc::new(Mutex::new(SessionState::default())),
            gate: CredentialGate::new(store),
            completion,
            renderer: RenderPipeline::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Publishes session events on `sender`.
    pub fn with_event_sender(mut self, sender: UnboundedSender<SessionEvent>) -> Self {
        self.journal.events = Some(sender);
        self
    }

    /// Checks the credential at session start.
    ///
    /// The first call appends one advisory when the credential is missing or
    /// could not be verified and asks the UI to show the credential entry.
    /// Later calls only refresh the status.
    pub async fn initialize(&self) -> CredentialStatus {
        let status = self.gate.check().await;
        self.emit(SessionEvent::CredentialStatusChanged {
            status: status.clone(),
        });

        if self.initialized.swap(true, Ordering::SeqCst) {
            return status;
        }

        tracing::info!("[Session] Initialized with credential status {:?}", status);
        match &status {
            CredentialStatus::Configured => {}
            CredentialStatus::Unconfigured => {
                self.append(Message::advisory(CREDENTIAL_SETUP_ADVISORY))
                    .await;
                self.emit(SessionEvent::CredentialPromptRequested);
            }
            CredentialStatus::Error(message) => {
                self.append(Message::advisory(format!(
                    "The API key could not be verified ({message}). \
                     Check the settings and save your key again."
                )))
                .await;
                self.emit(SessionEvent::CredentialPromptRequested);
            }
        }
        status
    }

    /// Submits user input.
    ///
    /// Ignored while a request is in flight and for blank input. Otherwise the
    /// trimmed prompt is appended, the completion backend is called, and the
    /// reply or an error entry is appended before the session becomes idle
    /// again. Requests are never retried or cancelled.
    ///
    /// The request runs on its own task: dropping the returned future does
    /// not abandon it, and a panicking backend is recorded as a failure.
    pub async fn submit(&self, raw_text: &str) -> SubmitOutcome {
        let prompt = {
            let mut state = self.state.lock().await;
            if state.busy {
                tracing::debug!("[Session] Submit ignored: request already in flight");
                return SubmitOutcome::IgnoredBusy;
            }

            let prompt = raw_text.trim();
            if prompt.is_empty() {
                return SubmitOutcome::IgnoredBlank;
            }

            self.append(Message::user(prompt)).await;
            state.begin(prompt);
            prompt.to_string()
        };
        self.emit(SessionEvent::BusyChanged { busy: true });
        tracing::info!("[Session] Sending prompt ({} chars)", prompt.chars().count());

        let request = {
            let journal = self.journal.clone();
            let state = Arc::clone(&self.state);
            let completion = Arc::clone(&self.completion);
            tokio::spawn(async move {
                let call = tokio::spawn(async move { completion.complete(&prompt).await });
                let result = call.await.unwrap_or_else(|e| {
                    tracing::error!("[Session] Completion task aborted: {}", e);
                    Err(CompletionError::Transport(format!(
                        "the request was aborted ({e})"
                    )))
                });
                journal.conclude(&state, result).await
            })
        };

        match request.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("[Session] Request task failed: {}", e);
                let error = CompletionError::Transport(format!("the request was aborted ({e})"));
                self.journal.conclude(&self.state, Err(error)).await
            }
        }
    }

    /// Validates and stores a new API key.
    pub async fn save_credential(
        &self,
        candidate: &str,
    ) -> Result<CredentialStatus, CredentialError> {
        let result = self.gate.save(candidate).await;
        if !matches!(result, Err(CredentialError::Validation)) {
            self.emit(SessionEvent::CredentialStatusChanged {
                status: self.gate.status().await,
            });
        }
        result
    }

    /// Loads the stored API key to pre-fill an edit field.
    pub async fn load_credential_for_display(&self) -> Result<String, CredentialError> {
        let result = self.gate.load_for_display().await;
        self.emit(SessionEvent::CredentialStatusChanged {
            status: self.gate.status().await,
        });
        result
    }

    pub async fn credential_status(&self) -> CredentialStatus {
        self.gate.status().await
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.busy
    }

    /// Prompt of the request in flight, if any.
    pub async fn pending_text(&self) -> Option<String> {
        self.state.lock().await.pending_user_text.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Snapshot of the transcript in insertion order.
    pub async fn transcript(&self) -> Vec<Arc<Message>> {
        self.journal.transcript.read().await.all().cloned().collect()
    }

    pub async fn transcript_len(&self) -> usize {
        self.journal.transcript.read().await.len()
    }

    /// Display form of `message`, computed once and cached on the message.
    pub fn render(&self, message: &Message) -> String {
        self.renderer.render(message)
    }

    /// Renders every message of the transcript.
    pub async fn rendered_transcript(&self) -> Vec<RenderedMessage> {
        let transcript = self.journal.transcript.read().await;
        transcript
            .all()
            .map(|message| RenderedMessage {
                role: message.role(),
                kind: message.kind(),
                html: self.renderer.render(message),
                timestamp: message.timestamp().to_string(),
            })
            .collect()
    }

    pub fn renderer(&self) -> &RenderPipeline {
        &self.renderer
    }

    async fn append(&self, message: Message) -> usize {
        self.journal.append(message).await
    }

    fn emit(&self, event: SessionEvent) {
        self.journal.emit(event);
    }
}

/// User-facing transcript text for a failed request.
pub fn failure_text(error: &CompletionError) -> String {
    match error {
        CompletionError::CredentialMissing => CREDENTIAL_MISSING_REPLY.to_string(),
        other => format!("{REQUEST_FAILURE_PREFIX}{other}"),
    }
}
