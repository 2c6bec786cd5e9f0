use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;

use crate::core::app::executors::validate_credential;
use crate::core::app::{
    apply_action, App, AppAction, AppActionContext, AppCommand, PresentationState,
    VerificationStatus,
};
use crate::core::chat_stream::StreamParams;
use crate::core::constants::STREAM_CANCELLED;
use crate::core::stream::SendOutcome;
use crate::core::validator::CredentialValidator;

/// Drives the reducer with effects run inline instead of on background
/// tasks, for one-shot commands and scenario tests.
pub struct Orchestrator {
    app: App,
    validator: Arc<dyn CredentialValidator>,
}

impl Orchestrator {
    pub fn new(app: App, validator: Arc<dyn CredentialValidator>) -> Self {
        Self { app, validator }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn presentation(&self) -> PresentationState<'_> {
        self.app.presentation()
    }

    pub async fn start(&mut self) {
        self.dispatch(AppAction::Startup, &mut |_: &str| {}).await;
    }

    /// Returns `true` once the credential verified and became active.
    pub async fn save_credential(&mut self, text: &str) -> bool {
        self.dispatch(
            AppAction::SaveCredential {
                credential: text.to_string(),
            },
            &mut |_: &str| {},
        )
        .await;
        self.app.ui.settings_status == VerificationStatus::Success
    }

    /// `None` when the submission was refused before anything was sent.
    pub async fn submit_message(&mut self, text: &str) -> Option<SendOutcome> {
        self.submit_message_streaming(text, |_| {}).await
    }

    pub async fn submit_message_streaming<F>(
        &mut self,
        text: &str,
        mut on_chunk: F,
    ) -> Option<SendOutcome>
    where
        F: FnMut(&str),
    {
        self.app.session.last_outcome = None;
        self.dispatch(
            AppAction::SubmitMessage {
                message: text.to_string(),
            },
            &mut on_chunk,
        )
        .await;
        self.app.session.last_outcome.clone()
    }

    pub fn on_user_activity(&mut self) {
        self.on_user_activity_at(Instant::now());
    }

    pub fn on_user_activity_at(&mut self, now: Instant) {
        apply_action(&mut self.app, AppAction::UserActivity, AppActionContext::at(now));
    }

    pub fn tick(&mut self, now: Instant) {
        apply_action(&mut self.app, AppAction::PresenceTick, AppActionContext::at(now));
    }

    async fn dispatch(&mut self, action: AppAction, on_chunk: &mut dyn FnMut(&str)) {
        let mut actions = VecDeque::from([action]);
        while let Some(action) = actions.pop_front() {
            let Some(command) = apply_action(&mut self.app, action, AppActionContext::now())
            else {
                continue;
            };
            match command {
                AppCommand::ValidateCredential(request) => {
                    actions.push_back(validate_credential(self.validator.as_ref(), request).await);
                }
                AppCommand::SpawnStream(params) => {
                    actions.extend(self.run_stream(params, on_chunk).await);
                }
            }
        }
    }

    /// Applies each chunk as it arrives; the returned actions finish the stream.
    async fn run_stream(
        &mut self,
        params: StreamParams,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Vec<AppAction> {
        let StreamParams {
            exchange,
            cancel_token,
            stream_id,
        } = params;

        let mut stream = match exchange.open().await {
            Ok(stream) => stream,
            Err(err) => return failed(stream_id, err.to_string()),
        };

        while let Some(item) = stream.next().await {
            // A cancelled reply is never committed, even partially.
            if cancel_token.is_cancelled() {
                return failed(stream_id, STREAM_CANCELLED.to_string());
            }
            match item {
                Ok(content) => {
                    on_chunk(&content);
                    apply_action(
                        &mut self.app,
                        AppAction::AppendResponseChunk { content, stream_id },
                        AppActionContext::now(),
                    );
                }
                Err(err) => return failed(stream_id, err.to_string()),
            }
        }

        vec![AppAction::StreamCompleted { stream_id }]
    }
}

fn failed(stream_id: u64, message: String) -> Vec<AppAction> {
    vec![
        AppAction::StreamErrored { message, stream_id },
        AppAction::StreamCompleted { stream_id },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credential::Credential;
    use crate::core::message::{Message, Role};
    use crate::core::validator::ProbeValidator;
    use crate::utils::test_utils::{create_test_app_with, ScriptedReply, ScriptedService};

    async fn ready_orchestrator(reply: ScriptedReply) -> Orchestrator {
        let service = Arc::new(ScriptedService::new().accept_key("good-key").reply(reply));
        let (app, _) =
            create_test_app_with(Arc::clone(&service), Some(Credential::new("good-key")));
        let validator = Arc::new(ProbeValidator::new(service, "gemini-2.5-flash"));
        let mut orchestrator = Orchestrator::new(app, validator);
        orchestrator.start().await;
        assert!(orchestrator.app().is_credential_valid());
        orchestrator
    }

    fn spawned(orchestrator: &mut Orchestrator, text: &str) -> StreamParams {
        let command = apply_action(
            &mut orchestrator.app,
            AppAction::SubmitMessage {
                message: text.to_string(),
            },
            AppActionContext::now(),
        );
        match command {
            Some(AppCommand::SpawnStream(params)) => params,
            _ => panic!("expected a stream to be spawned"),
        }
    }

    #[tokio::test]
    async fn cancelled_stream_is_settled_as_a_failure() {
        let mut orchestrator =
            ready_orchestrator(ScriptedReply::fragments(["Hi", " there", "!"])).await;
        let params = spawned(&mut orchestrator, "hello");
        let token = params.cancel_token.clone();

        let mut seen = Vec::new();
        let finish = orchestrator
            .run_stream(params, &mut |chunk: &str| {
                seen.push(chunk.to_string());
                token.cancel();
            })
            .await;
        for action in finish {
            apply_action(&mut orchestrator.app, action, AppActionContext::now());
        }

        assert_eq!(seen, vec!["Hi"]);
        let conversation = orchestrator.app().conversation.all();
        assert_eq!(conversation.last().map(|m| m.role), Some(Role::User));
        assert!(!conversation.contains(&Message::model("Hi")));
        assert!(matches!(
            orchestrator.app().session.last_outcome,
            Some(SendOutcome::Failure { .. })
        ));
        assert!(!orchestrator.app().is_sending());
    }

    #[tokio::test]
    async fn stream_that_fails_to_open_keeps_only_the_user_turn() {
        let mut orchestrator = ready_orchestrator(ScriptedReply::refuse("unreachable")).await;

        let outcome = orchestrator.submit_message("hello").await;

        assert!(matches!(outcome, Some(SendOutcome::Failure { ref reason }) if reason.contains("unreachable")));
        let conversation = orchestrator.app().conversation.all();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[1], Message::user("hello"));
        assert!(orchestrator.presentation().last_error.is_some());
    }

    #[tokio::test]
    async fn blank_message_is_refused_before_sending() {
        let mut orchestrator = ready_orchestrator(ScriptedReply::fragments(["unused"])).await;

        assert_eq!(orchestrator.submit_message("   ").await, None);
        assert_eq!(orchestrator.app().conversation.len(), 1);
    }
}
