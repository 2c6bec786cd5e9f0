//! Event polling, dispatching, and UI rendering loop.
//!
//! The loop polls terminal input, turns it into [`AppAction`]s, applies
//! queued actions to the shared [`App`](crate::core::app::App), starts the
//! background work the reducer asks for (credential probes and response
//! streams) and redraws at most 60 times a second.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{Local, Timelike};
use ratatui::crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::app::setup::StartupOptions;
use crate::core::app::{
    apply_actions, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope, AppCommand,
};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::config::ThemePreference;
use crate::core::validator::CredentialValidator;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::ui::view::ChatView;
use crate::utils::input::sanitize_text_input;

use super::executors::validation::spawn_validation;
use super::keybindings::{resolve_key, KeyIntent, SCROLL_PAGE};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use super::setup::bootstrap_app;
use super::AppHandle;

const MOUSE_SCROLL_LINES: u16 = 3;
const PRESENCE_TICK: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

/// Terminal-side state the loop owns outright.
struct ViewState {
    view: ChatView,
    theme: Theme,
    theme_preference: ThemePreference,
}

impl ViewState {
    fn new(preference: ThemePreference) -> Self {
        let theme = Theme::for_preference(preference);
        let mut view = ChatView::new();
        view.apply_theme(&theme);
        Self {
            view,
            theme,
            theme_preference: preference,
        }
    }

    /// Rebuilds the palette when the preference changed. Returns `true` if
    /// it did.
    fn sync_theme(&mut self, preference: ThemePreference) -> bool {
        if preference == self.theme_preference {
            return false;
        }
        self.theme = Theme::for_preference(preference);
        self.view.apply_theme(&self.theme);
        self.theme_preference = preference;
        true
    }
}

async fn is_exit_requested(app: &AppHandle) -> bool {
    app.read(|app| app.exit_requested()).await
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    views: &mut ViewState,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    let wall_clock = Local::now();
    app.read(|app| {
        terminal_guard.draw(|f| {
            ui(
                f,
                &app.presentation(),
                &mut views.view,
                &views.theme,
                wall_clock,
            )
        })
    })
    .await?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

struct EventProcessingOutcome {
    events_processed: bool,
    request_redraw: bool,
}

async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    views: &mut ViewState,
    dispatcher: &AppActionDispatcher,
) -> EventProcessingOutcome {
    let mut outcome = EventProcessingOutcome {
        events_processed: false,
        request_redraw: false,
    };
    let mut idle = app.read(|app| app.presence.is_idle()).await;

    while let Ok(UiEvent::Crossterm(ev)) = event_rx.try_recv() {
        outcome.events_processed = true;
        if is_interaction(&ev) {
            dispatcher.dispatch(AppAction::UserActivity, AppActionContext::now());
            if idle {
                debug!("input woke the idle screen");
                idle = false;
                if !delivered_on_wake(&ev) {
                    continue;
                }
            }
        }

        match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                route_keyboard_event(app, views, dispatcher, key).await;
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => views.view.scroll_up(MOUSE_SCROLL_LINES),
                MouseEventKind::ScrollDown => views.view.scroll_down(MOUSE_SCROLL_LINES),
                _ => {}
            },
            Event::Paste(text) => handle_paste_event(app, views, &text).await,
            _ => {}
        }
    }

    if outcome.events_processed {
        outcome.request_redraw = true;
    }

    outcome
}

/// Held keys report `Repeat` and keep the screen awake like presses do.
fn is_interaction(ev: &Event) -> bool {
    match ev {
        Event::Key(key) => key.kind != KeyEventKind::Release,
        Event::Mouse(_) | Event::Paste(_) => true,
        _ => false,
    }
}

/// The input that wakes the idle screen is consumed, except Ctrl+C.
fn delivered_on_wake(ev: &Event) -> bool {
    matches!(
        ev,
        Event::Key(key)
            if key.kind == KeyEventKind::Press
                && matches!(resolve_key(key, false), KeyIntent::Quit)
    )
}

async fn route_keyboard_event(
    app: &AppHandle,
    views: &mut ViewState,
    dispatcher: &AppActionDispatcher,
    key: KeyEvent,
) {
    let (settings_open, can_send) = app
        .read(|app| {
            (
                app.ui.settings_open,
                app.is_credential_valid() && !app.is_sending(),
            )
        })
        .await;
    let composing = can_send && !settings_open;
    let ctx = AppActionContext::now();

    match resolve_key(&key, settings_open) {
        KeyIntent::Quit => dispatcher.dispatch(AppAction::Quit, ctx),
        KeyIntent::OpenSettings => dispatcher.dispatch(AppAction::OpenSettings, ctx),
        KeyIntent::CloseSettings => dispatcher.dispatch(AppAction::CloseSettings, ctx),
        KeyIntent::ToggleTheme => dispatcher.dispatch(AppAction::ToggleTheme, ctx),
        KeyIntent::DismissError => dispatcher.dispatch(AppAction::DismissError, ctx),
        KeyIntent::Submit => {
            if composing && !views.view.input_text().trim().is_empty() {
                let message = views.view.take_input();
                views.view.scroll_to_bottom();
                dispatcher.dispatch(AppAction::SubmitMessage { message }, ctx);
            }
        }
        KeyIntent::SaveKey => {
            let credential = views.view.take_key();
            dispatcher.dispatch(AppAction::SaveCredential { credential }, ctx);
        }
        KeyIntent::NewLine => {
            if composing {
                views.view.insert_into_input("\n");
            }
        }
        KeyIntent::InsertSuggestion(index) => {
            if composing {
                views.view.insert_suggestion(index);
            }
        }
        KeyIntent::ScrollUp => views.view.scroll_up(SCROLL_PAGE),
        KeyIntent::ScrollDown => views.view.scroll_down(SCROLL_PAGE),
        KeyIntent::Edit => {
            if settings_open {
                views.view.handle_key_field_key(key);
            } else if composing {
                views.view.handle_input_key(key);
            }
        }
    }
}

async fn handle_paste_event(app: &AppHandle, views: &mut ViewState, text: &str) {
    let sanitized = sanitize_text_input(text);
    if sanitized.is_empty() {
        return;
    }
    let (settings_open, can_send) = app
        .read(|app| {
            (
                app.ui.settings_open,
                app.is_credential_valid() && !app.is_sending(),
            )
        })
        .await;
    if settings_open {
        views.view.insert_into_key(&sanitized);
    } else if can_send {
        views.view.insert_into_input(&sanitized);
    }
}

/// Drains stream messages into actions. Adjacent chunks are concatenated
/// in arrival order; messages for any stream other than the current one are
/// dropped.
fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    current_stream_id: u64,
) -> bool {
    let mut received_any = false;
    let mut actions = Vec::new();
    let mut coalesced_chunks = String::new();

    while let Ok((message, msg_stream_id)) = rx.try_recv() {
        if msg_stream_id != current_stream_id {
            continue;
        }
        received_any = true;

        match message {
            StreamMessage::Chunk(content) => coalesced_chunks.push_str(&content),
            StreamMessage::Error(message) => {
                flush_chunks(&mut actions, &mut coalesced_chunks, msg_stream_id);
                actions.push(AppAction::StreamErrored {
                    message,
                    stream_id: msg_stream_id,
                });
            }
            StreamMessage::End => {
                flush_chunks(&mut actions, &mut coalesced_chunks, msg_stream_id);
                actions.push(AppAction::StreamCompleted {
                    stream_id: msg_stream_id,
                });
            }
        }
    }
    flush_chunks(&mut actions, &mut coalesced_chunks, current_stream_id);

    if !actions.is_empty() {
        dispatcher.dispatch_many(actions, AppActionContext::now());
    }

    received_any
}

fn flush_chunks(actions: &mut Vec<AppAction>, chunks: &mut String, stream_id: u64) {
    if chunks.is_empty() {
        return;
    }
    actions.push(AppAction::AppendResponseChunk {
        content: std::mem::take(chunks),
        stream_id,
    });
}

async fn drain_action_queue(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    stream_service: &ChatStreamService,
    validator: &Arc<dyn CredentialValidator>,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for cmd in commands {
        match cmd {
            AppCommand::SpawnStream(params) => {
                stream_service.spawn_stream(params);
            }
            AppCommand::ValidateCredential(request) => {
                spawn_validation(dispatcher.clone(), Arc::clone(validator), request);
            }
        }
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(options: StartupOptions) -> Result<(), Box<dyn Error>> {
    let (app, validator) = bootstrap_app(options)?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let action_dispatcher = AppActionDispatcher::new(action_tx);
    action_dispatcher.dispatch(AppAction::Startup, AppActionContext::now());

    let terminal = setup_terminal()?;
    info!("chat UI started");

    let (stream_service, mut rx) = ChatStreamService::new();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let initial_theme = app.read(|app| app.ui.theme).await;
    let mut views = ViewState::new(initial_theme);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;
    let mut last_tick = Instant::now();
    let mut idle_visible = false;
    let mut last_clock_second = None;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if is_exit_requested(&app).await {
            break 'main_loop Ok(());
        }

        if let Err(err) = try_draw_frame(
            &app,
            &terminal,
            &mut views,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await
        {
            break 'main_loop Err(err.into());
        }

        let event_outcome =
            process_ui_events(&app, &mut event_rx, &mut views, &action_dispatcher).await;
        if event_outcome.request_redraw {
            request_redraw = true;
        }

        let current_stream_id = app.read(|app| app.session.current_stream_id).await;
        let received_any = process_stream_updates(&action_dispatcher, &mut rx, current_stream_id);
        if received_any {
            request_redraw = true;
        }

        if last_tick.elapsed() >= PRESENCE_TICK {
            action_dispatcher.dispatch(AppAction::PresenceTick, AppActionContext::now());
            last_tick = Instant::now();
        }

        let actions_applied = drain_action_queue(
            &app,
            &action_dispatcher,
            &stream_service,
            &validator,
            &mut action_rx,
        )
        .await;
        if actions_applied {
            request_redraw = true;
        }

        let (theme_now, idle_now) = app.read(|app| (app.ui.theme, app.presence.is_idle())).await;
        if views.sync_theme(theme_now) {
            request_redraw = true;
        }
        if idle_now != idle_visible {
            idle_visible = idle_now;
            request_redraw = true;
        }
        if idle_now {
            let second = Local::now().second();
            if last_clock_second != Some(second) {
                last_clock_second = Some(second);
                request_redraw = true;
            }
        }

        let quiet = !event_outcome.events_processed && !received_any && !request_redraw;
        if quiet {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    app.update(|app| app.cancel_active_stream()).await;
    restore_terminal(&terminal).await?;
    info!("chat UI stopped");
    result
}
