use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::app::ActiveSend;
use crate::core::chat_stream::StreamParams;
use crate::core::presence::PresenceEvent;
use crate::core::stream::{SendOutcome, StreamAccumulator};

pub const SESSION_UNAVAILABLE: &str =
    "Chat session is not initialized or API key is invalid.";

pub(super) fn handle_streaming_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::SubmitMessage { message } => submit_message(app, message, ctx),
        AppAction::AppendResponseChunk { content, stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            append_response_chunk(app, &content, stream_id);
            None
        }
        AppAction::StreamErrored { message, stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            handle_stream_error(app, message, stream_id, ctx);
            None
        }
        AppAction::StreamCompleted { stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            finalize_stream(app, stream_id, ctx);
            None
        }
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

fn submit_message(app: &mut App, message: String, ctx: AppActionContext) -> Option<AppCommand> {
    let text = message.trim();
    if text.is_empty() {
        return None;
    }
    if app.is_sending() {
        debug!("ignoring submission while a response is streaming");
        return None;
    }

    let exchange = match app.session.current.as_ref() {
        Some(session) if app.is_credential_valid() => session.exchange(text),
        _ => {
            app.ui.last_error = Some(SESSION_UNAVAILABLE.to_string());
            return None;
        }
    };

    app.ui.last_error = None;
    let stream_id = app.next_stream_id();
    let cancel_token = CancellationToken::new();
    let accumulator = StreamAccumulator::begin(&mut app.conversation, text);
    app.session.active_send = Some(ActiveSend {
        stream_id,
        user_text: text.to_string(),
        accumulator,
        cancel_token: cancel_token.clone(),
    });
    app.presence.handle(PresenceEvent::StreamStarted, ctx.now);
    info!(stream_id, "sending message");

    Some(AppCommand::SpawnStream(StreamParams {
        exchange,
        cancel_token,
        stream_id,
    }))
}

fn append_response_chunk(app: &mut App, chunk: &str, stream_id: u64) {
    if let Some(active) = app.session.active_send.as_mut() {
        if active.stream_id == stream_id {
            active.accumulator.apply_fragment(&mut app.conversation, chunk);
        }
    }
}

fn take_active_send(app: &mut App, stream_id: u64) -> Option<ActiveSend> {
    match &app.session.active_send {
        Some(active) if active.stream_id == stream_id => app.session.active_send.take(),
        _ => None,
    }
}

fn handle_stream_error(app: &mut App, message: String, stream_id: u64, ctx: AppActionContext) {
    let Some(active) = take_active_send(app, stream_id) else {
        return;
    };
    warn!(stream_id, "stream failed: {message}");
    app.ui.last_error = Some(format!("Error: {message}"));
    let outcome = active.accumulator.fail(&mut app.conversation, message);
    settle(app, outcome, ctx);
}

fn finalize_stream(app: &mut App, stream_id: u64, ctx: AppActionContext) {
    // Failed streams were already settled by their error.
    let Some(active) = take_active_send(app, stream_id) else {
        return;
    };
    if let Some(session) = app.session.current.as_mut() {
        session.record_exchange(&active.user_text, active.accumulator.text());
    }
    info!(stream_id, chars = active.accumulator.text().len(), "stream completed");
    let outcome = active.accumulator.complete();
    settle(app, outcome, ctx);
}

fn settle(app: &mut App, outcome: SendOutcome, ctx: AppActionContext) {
    app.presence.handle(PresenceEvent::StreamSettled, ctx.now);
    app.session.last_outcome = Some(outcome);
}
