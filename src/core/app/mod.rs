//! Application state and the reducer that owns every mutation of it.
//!
//! All state lives in [`App`]. Background work (credential probes and
//! response streams) never touches it directly: results come back as
//! [`AppAction`]s and are applied through [`apply_action`], one at a time.

pub mod actions;
pub mod executors;
pub mod orchestrator;
pub mod setup;


use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand, ValidationRequest,
};
pub use orchestrator::Orchestrator;

use crate::core::config::{Config, ThemePreference};
use crate::core::conversation::ConversationStore;
use crate::core::credential::{Credential, CredentialStore};
use crate::core::message::Message;
use crate::core::presence::IdlePresenceMonitor;
use crate::core::session::{Session, SessionFactory};
use crate::core::stream::{SendOutcome, StreamAccumulator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    NoCredential,
    Validating,
    Ready,
    Invalid,
}

impl CredentialState {
    pub fn label(self) -> &'static str {
        match self {
            CredentialState::NoCredential => "no key",
            CredentialState::Validating => "verifying",
            CredentialState::Ready => "ready",
            CredentialState::Invalid => "invalid key",
        }
    }
}

/// Outcome of the most recent save from the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationStatus {
    #[default]
    Idle,
    Verifying,
    Success,
    Error,
    /// The save was refused without probing (a send was in flight).
    Rejected,
}

/// A validation that has been requested but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingValidation {
    pub request_id: u64,
    pub credential: Credential,
    /// Saves are persisted once they verify; the startup check is not.
    pub persist: bool,
}

pub struct CredentialContext {
    pub store: Arc<dyn CredentialStore>,
    pub current: Option<Credential>,
    pub state: CredentialState,
    pub pending_validation: Option<PendingValidation>,
    next_request_id: u64,
}

pub struct ActiveSend {
    pub stream_id: u64,
    pub user_text: String,
    pub accumulator: StreamAccumulator,
    pub cancel_token: CancellationToken,
}

pub struct SessionContext {
    pub factory: SessionFactory,
    pub current: Option<Session>,
    pub current_stream_id: u64,
    pub active_send: Option<ActiveSend>,
    pub last_outcome: Option<SendOutcome>,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub settings_open: bool,
    pub settings_status: VerificationStatus,
    pub last_error: Option<String>,
    pub theme: ThemePreference,
    pub exit_requested: bool,
}

pub struct App {
    pub credential: CredentialContext,
    pub session: SessionContext,
    pub conversation: ConversationStore,
    pub presence: IdlePresenceMonitor,
    pub ui: UiState,
    pub config: Config,
    /// Where theme changes are written; `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
}

/// Read-only projection handed to the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct PresentationState<'a> {
    pub conversation: &'a [Message],
    pub is_sending: bool,
    pub is_idle: bool,
    pub last_error: Option<&'a str>,
    pub is_credential_valid: bool,
    pub orchestrator_state: CredentialState,
    pub theme: ThemePreference,
    pub settings_open: bool,
    pub settings_status: VerificationStatus,
}

impl App {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        factory: SessionFactory,
        presence: IdlePresenceMonitor,
        config: Config,
        config_path: Option<PathBuf>,
    ) -> Self {
        let ui = UiState {
            theme: config.theme,
            ..UiState::default()
        };
        Self {
            credential: CredentialContext {
                store,
                current: None,
                state: CredentialState::NoCredential,
                pending_validation: None,
                next_request_id: 0,
            },
            session: SessionContext {
                factory,
                current: None,
                current_stream_id: 0,
                active_send: None,
                last_outcome: None,
            },
            conversation: ConversationStore::new(),
            presence,
            ui,
            config,
            config_path,
        }
    }

    pub fn presentation(&self) -> PresentationState<'_> {
        PresentationState {
            conversation: self.conversation.all(),
            is_sending: self.is_sending(),
            is_idle: self.presence.is_idle(),
            last_error: self.ui.last_error.as_deref(),
            is_credential_valid: self.is_credential_valid(),
            orchestrator_state: self.credential.state,
            theme: self.ui.theme,
            settings_open: self.ui.settings_open,
            settings_status: self.ui.settings_status,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.session.active_send.is_some()
    }

    pub fn is_credential_valid(&self) -> bool {
        self.credential.state == CredentialState::Ready
    }

    /// The settings panel may only be dismissed once a key works.
    pub fn is_key_required(&self) -> bool {
        !self.is_credential_valid()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.session.current.as_ref()
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.session.current_stream_id == stream_id
    }

    pub fn exit_requested(&self) -> bool {
        self.ui.exit_requested
    }

    /// Moves to `Validating` and discards the current session. Any earlier
    /// validation still in flight becomes stale.
    pub(crate) fn begin_validation(
        &mut self,
        credential: Credential,
        persist: bool,
    ) -> ValidationRequest {
        self.credential.next_request_id += 1;
        let request_id = self.credential.next_request_id;
        self.credential.state = CredentialState::Validating;
        self.credential.pending_validation = Some(PendingValidation {
            request_id,
            credential: credential.clone(),
            persist,
        });
        if let Some(session) = self.session.current.take() {
            debug!(session = %session.id(), "discarding session pending validation");
        }
        debug!(request_id, persist, "validating credential");
        ValidationRequest {
            request_id,
            credential,
        }
    }

    /// Takes the pending validation if `request_id` is the latest one.
    pub(crate) fn take_pending_validation(&mut self, request_id: u64) -> Option<PendingValidation> {
        match &self.credential.pending_validation {
            Some(pending) if pending.request_id == request_id => {
                self.credential.pending_validation.take()
            }
            _ => {
                debug!(request_id, "ignoring stale validation result");
                None
            }
        }
    }

    pub(crate) fn next_stream_id(&mut self) -> u64 {
        self.session.current_stream_id += 1;
        self.session.current_stream_id
    }

    pub fn cancel_active_stream(&mut self) {
        if let Some(active) = &self.session.active_send {
            active.cancel_token.cancel();
        }
    }

    pub(crate) fn persist_config(&mut self) {
        self.config.theme = self.ui.theme;
        let Some(path) = self.config_path.as_deref() else {
            return;
        };
        if let Err(err) = self.config.save_to_path(path) {
            warn!("failed to save config: {err}");
            self.ui.last_error = Some(err.to_string());
        }
    }
}
