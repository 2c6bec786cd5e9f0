use tracing::{info, warn};

use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::app::{CredentialState, PendingValidation, VerificationStatus};
use crate::core::constants::GREETING;
use crate::core::credential::Credential;
use crate::core::message::Message;

pub const SAVE_WHILE_SENDING: &str =
    "The API key cannot be changed while a response is still streaming.";

pub(super) fn handle_credential_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::Startup => startup(app),
        AppAction::SaveCredential { credential } => save_credential(app, credential),
        AppAction::ValidationCompleted { request_id, valid } => {
            let pending = app.take_pending_validation(request_id)?;
            if valid {
                accept(app, pending);
            } else {
                reject(app, pending);
            }
            None
        }
        AppAction::ValidationFailed { request_id, error } => {
            let pending = app.take_pending_validation(request_id)?;
            warn!(request_id, "credential validation did not finish: {error}");
            reject(app, pending);
            app.ui.last_error = Some(error);
            None
        }
        _ => unreachable!("non-credential action routed to credential handler"),
    }
}

fn startup(app: &mut App) -> Option<AppCommand> {
    let stored = match app.credential.store.get() {
        Ok(stored) => stored,
        Err(err) => {
            warn!("could not read stored API key: {err}");
            None
        }
    };

    match stored.filter(|credential| !credential.is_empty()) {
        Some(credential) => {
            app.credential.current = Some(credential.clone());
            let request = app.begin_validation(credential, false);
            Some(AppCommand::ValidateCredential(request))
        }
        None => {
            info!("no stored API key; waiting for one");
            app.credential.state = CredentialState::NoCredential;
            app.ui.settings_open = true;
            None
        }
    }
}

fn save_credential(app: &mut App, raw: String) -> Option<AppCommand> {
    if app.is_sending() {
        warn!("refusing to replace the API key mid-stream");
        app.ui.settings_status = VerificationStatus::Rejected;
        app.ui.last_error = Some(SAVE_WHILE_SENDING.to_string());
        return None;
    }

    app.ui.settings_status = VerificationStatus::Verifying;
    let request = app.begin_validation(Credential::new(raw), true);
    Some(AppCommand::ValidateCredential(request))
}

fn accept(app: &mut App, pending: PendingValidation) {
    app.ui.last_error = None;
    if pending.persist {
        if let Err(err) = app.credential.store.set(&pending.credential) {
            warn!("verified API key could not be stored: {err}");
            app.ui.last_error = Some(format!("The API key works but could not be saved: {err}"));
        }
        app.ui.settings_status = VerificationStatus::Success;
        app.ui.settings_open = false;
    }

    let session = app.session.factory.create(pending.credential.clone());
    info!(session = %session.id(), "API key verified");
    app.session.current = Some(session);
    app.credential.current = Some(pending.credential);
    app.credential.state = CredentialState::Ready;
    app.conversation.reset_with(Message::model(GREETING));
}

fn reject(app: &mut App, pending: PendingValidation) {
    info!(request_id = pending.request_id, "API key rejected");
    app.session.current = None;
    app.credential.state = CredentialState::Invalid;
    app.ui.settings_open = true;
    if pending.persist {
        app.ui.settings_status = VerificationStatus::Error;
    }
}
