use std::{collections::HashMap, time::Duration};

use shared::protocol::{ActionKind, ServerReply};
use tokio::sync::{oneshot, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

pub mod actions;
pub mod config;
pub mod envelope;
pub mod error;
pub mod reducer;
pub mod registry;
pub mod transport;
pub mod validation;

pub use actions::{ActionDescriptor, Reconciliation, PROCESS_FALLBACK_MESSAGE};
pub use config::{load_settings, ClientSettings};
pub use envelope::SubmissionEnvelope;
pub use error::{TransportError, UploadError};
pub use reducer::{ActionPhase, ModeFlags, UiEvent, UiState};
pub use registry::{ElementRegistry, MemoryRegistry, SelectedFile};
pub use transport::{HttpTransport, RawReply, UploadTransport};

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Completed(ServerReply),
    /// The same action was already validating or in flight; nothing was sent.
    AlreadyInFlight,
}

/// Drives mode toggles, validation, submission and reply reconciliation
/// against an [`ElementRegistry`]. Shared behind `Arc`; locks are never held
/// across the network request.
pub struct UploadOrchestrator<R, T> {
    registry: Mutex<R>,
    state: Mutex<UiState>,
    transport: T,
    request_timeout: Duration,
    cancellations: Mutex<HashMap<ActionKind, oneshot::Sender<()>>>,
}

impl<R, T> UploadOrchestrator<R, T>
where
    R: ElementRegistry,
    T: UploadTransport,
{
    pub fn new(registry: R, transport: T, settings: &ClientSettings) -> Self {
        Self {
            registry: Mutex::new(registry),
            state: Mutex::new(UiState::default()),
            transport,
            request_timeout: settings.request_timeout(),
            cancellations: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Page load: hides the alternates of the default mode.
    pub async fn initialize(&self) {
        let state = self.state.lock().await;
        self.render_sections(state.modes()).await;
    }

    pub async fn set_calibration_mode(&self, on: bool) {
        self.toggle(UiEvent::CalibrationModeToggled(on)).await;
        info!(calibration_mode = on, "mode toggled");
    }

    pub async fn set_model_mode(&self, on: bool) {
        self.toggle(UiEvent::ModelModeToggled(on)).await;
        info!(model_mode = on, "mode toggled");
    }

    pub async fn snapshot(&self) -> UiState {
        self.state.lock().await.clone()
    }

    pub async fn registry(&self) -> MutexGuard<'_, R> {
        self.registry.lock().await
    }

    /// For callers outside the async runtime, such as a GUI thread.
    pub fn registry_blocking(&self) -> MutexGuard<'_, R> {
        self.registry.blocking_lock()
    }

    /// Aborts the in-flight request of `action`. Returns whether one was pending.
    pub async fn cancel(&self, action: ActionKind) -> bool {
        match self.cancellations.lock().await.remove(&action) {
            Some(cancel) => cancel.send(()).is_ok(),
            None => false,
        }
    }

    pub async fn activate(&self, action: ActionKind) -> Result<ActionOutcome, UploadError> {
        let descriptor = ActionDescriptor::for_kind(action);

        let modes = {
            let mut state = self.state.lock().await;
            if state.is_busy(action) {
                debug!(action = action.name(), "ignoring repeat activation while in flight");
                return Ok(ActionOutcome::AlreadyInFlight);
            }
            *state = state.reduce(&UiEvent::ActionActivated(action));
            state.modes()
        };

        let validation = {
            let mut registry = self.registry.lock().await;
            let validation = validation::validate(descriptor, modes, &*registry);
            for input in &validation.checked {
                registry.set_error_marker(*input, validation.missing.contains(input));
            }
            if !validation.is_valid() {
                registry.notify(&descriptor.missing_notice(&validation.missing));
            }
            validation
        };

        self.apply(UiEvent::ValidationFinished {
            action,
            checked: validation.checked.clone(),
            missing: validation.missing.clone(),
        })
        .await;

        let envelope = validation.into_envelope()?;
        let entered = envelope.entered_values();
        let submission_id = envelope.id();
        info!(
            action = action.name(),
            %submission_id,
            parts = ?envelope.part_names(),
            bytes = envelope.payload_bytes(),
            "submitting"
        );

        let outcome = match self.send(descriptor, envelope).await {
            Ok(raw) => interpret_reply(raw),
            Err(e) => Err(UploadError::Transport(e)),
        };

        let reconciliation = match &outcome {
            Ok(reply) => {
                info!(action = action.name(), %submission_id, "submission succeeded");
                descriptor.on_success(reply, &entered)
            }
            Err(UploadError::Application { status, message }) => {
                warn!(action = action.name(), %submission_id, status, %message, "server rejected submission");
                descriptor.on_application_error(message)
            }
            Err(other) => {
                error!(action = action.name(), %submission_id, error = %other, "submission failed");
                descriptor.on_transport_error()
            }
        };
        reconciliation.apply(&mut *self.registry.lock().await);

        let finished = if outcome.is_ok() {
            UiEvent::SubmissionSucceeded(action)
        } else {
            UiEvent::SubmissionFailed(action)
        };
        self.apply(finished).await;

        outcome.map(ActionOutcome::Completed)
    }

    async fn send(
        &self,
        descriptor: &ActionDescriptor,
        envelope: SubmissionEnvelope,
    ) -> Result<RawReply, TransportError> {
        let action = descriptor.kind;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.cancellations.lock().await.insert(action, cancel_tx);

        let request = tokio::time::timeout(
            self.request_timeout,
            self.transport.submit(descriptor.endpoint(), envelope),
        );
        let result = tokio::select! {
            outcome = request => match outcome {
                Ok(reply) => reply,
                Err(_) => Err(TransportError::TimedOut(self.request_timeout)),
            },
            _ = cancel_rx => Err(TransportError::Cancelled),
        };

        self.cancellations.lock().await.remove(&action);
        result
    }

    /// Sections are rendered under the state lock (state, then registry) so
    /// concurrent toggles cannot leave visibility behind the mode flags.
    async fn toggle(&self, event: UiEvent) {
        let mut state = self.state.lock().await;
        *state = state.reduce(&event);
        self.render_sections(state.modes()).await;
    }

    async fn apply(&self, event: UiEvent) -> UiState {
        let mut state = self.state.lock().await;
        *state = state.reduce(&event);
        state.clone()
    }

    async fn render_sections(&self, modes: ModeFlags) {
        let mut registry = self.registry.lock().await;
        for (section, visible) in modes.section_visibility() {
            registry.set_visible(section, visible);
        }
    }
}

/// JSON is parsed regardless of status; the status alone decides success.
fn interpret_reply(raw: RawReply) -> Result<ServerReply, UploadError> {
    let parsed = serde_json::from_slice::<ServerReply>(&raw.body);
    match (raw.is_success(), parsed) {
        (true, Ok(reply)) => Ok(reply),
        (false, Ok(reply)) => Err(UploadError::Application {
            status: raw.status,
            message: reply
                .error
                .unwrap_or_else(|| format!("server responded with status {}", raw.status)),
        }),
        (_, Err(e)) => Err(UploadError::Transport(TransportError::MalformedResponse {
            status: raw.status,
            reason: e.to_string(),
        })),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
