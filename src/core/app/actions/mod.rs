mod credential;
mod streaming;
mod ui;

pub use credential::SAVE_WHILE_SENDING;
pub use streaming::SESSION_UNAVAILABLE;

use std::time::Instant;

use tokio::sync::mpsc;

use super::App;
use crate::core::chat_stream::StreamParams;
use crate::core::credential::Credential;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Reads the stored credential and starts validating it.
    Startup,
    SaveCredential {
        credential: String,
    },
    ValidationCompleted {
        request_id: u64,
        valid: bool,
    },
    /// The probe task itself failed (panicked or was aborted).
    ValidationFailed {
        request_id: u64,
        error: String,
    },
    SubmitMessage {
        message: String,
    },
    AppendResponseChunk {
        content: String,
        stream_id: u64,
    },
    StreamErrored {
        message: String,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    UserActivity,
    PresenceTick,
    OpenSettings,
    CloseSettings,
    ToggleTheme,
    DismissError,
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct AppActionContext {
    pub now: Instant,
}

impl AppActionContext {
    pub fn now() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    pub fn at(now: Instant) -> Self {
        Self { now }
    }
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) {
        self.dispatch_many([action], ctx);
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub request_id: u64,
    pub credential: Credential,
}

pub enum AppCommand {
    ValidateCredential(ValidationRequest),
    SpawnStream(StreamParams),
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::Startup
        | AppAction::SaveCredential { .. }
        | AppAction::ValidationCompleted { .. }
        | AppAction::ValidationFailed { .. } => {
            credential::handle_credential_action(app, action, ctx)
        }

        AppAction::SubmitMessage { .. }
        | AppAction::AppendResponseChunk { .. }
        | AppAction::StreamErrored { .. }
        | AppAction::StreamCompleted { .. } => streaming::handle_streaming_action(app, action, ctx),

        AppAction::UserActivity
        | AppAction::PresenceTick
        | AppAction::OpenSettings
        | AppAction::CloseSettings
        | AppAction::ToggleTheme
        | AppAction::DismissError
        | AppAction::Quit => ui::handle_ui_action(app, action, ctx),
    }
}
