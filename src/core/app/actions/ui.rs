use tracing::debug;

use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::app::VerificationStatus;
use crate::core::presence::PresenceEvent;

pub(super) fn handle_ui_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::UserActivity => {
            app.presence.on_activity(ctx.now);
        }
        AppAction::PresenceTick => {
            app.presence.handle(PresenceEvent::Tick, ctx.now);
        }
        AppAction::OpenSettings => {
            app.ui.settings_open = true;
            app.ui.settings_status = VerificationStatus::Idle;
        }
        AppAction::CloseSettings => {
            if app.is_key_required() {
                debug!("settings stay open until a key verifies");
            } else {
                app.ui.settings_open = false;
            }
        }
        AppAction::ToggleTheme => {
            app.ui.theme = app.ui.theme.toggled();
            app.persist_config();
        }
        AppAction::DismissError => {
            app.ui.last_error = None;
        }
        AppAction::Quit => {
            app.cancel_active_stream();
            app.ui.exit_requested = true;
        }
        _ => unreachable!("non-ui action routed to ui handler"),
    }
    None
}
