use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::api::Content;
use crate::core::credential::Credential;
use crate::core::service::{FragmentStream, GenerationService, ServiceError, StreamRequest};

/// Fixed parameters every session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Conversation context bound to one validated credential.
///
/// The session keeps the committed turns it has exchanged so every request
/// carries the prior context. Only completed exchanges are recorded.
pub struct Session {
    id: SessionId,
    credential: Credential,
    config: Arc<SessionConfig>,
    service: Arc<dyn GenerationService>,
    history: Vec<Content>,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Prepares a streamed exchange for `text` without touching the network.
    pub fn exchange(&self, text: &str) -> PendingExchange {
        let system_instruction = if self.config.system_instruction.is_empty() {
            None
        } else {
            Some(self.config.system_instruction.clone())
        };
        PendingExchange {
            service: Arc::clone(&self.service),
            request: StreamRequest {
                credential: self.credential.clone(),
                model: self.config.model.clone(),
                system_instruction,
                history: self.history.clone(),
                message: text.to_string(),
            },
        }
    }

    /// Commits a finished exchange to the session history.
    pub fn record_exchange(&mut self, user_text: &str, model_text: &str) {
        self.history.push(Content::user(user_text));
        self.history.push(Content::model(model_text));
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("credential", &self.credential)
            .field("model", &self.config.model)
            .field("turns", &self.history.len())
            .finish()
    }
}

/// A request ready to be opened, detached from the session so it can move
/// into a background task.
pub struct PendingExchange {
    service: Arc<dyn GenerationService>,
    request: StreamRequest,
}

impl PendingExchange {
    pub fn message(&self) -> &str {
        &self.request.message
    }

    pub async fn open(self) -> Result<FragmentStream, ServiceError> {
        self.service.open_stream(self.request).await
    }
}

/// Builds sessions; each one gets a fresh, strictly increasing id.
pub struct SessionFactory {
    config: Arc<SessionConfig>,
    service: Arc<dyn GenerationService>,
    next_id: u64,
}

impl SessionFactory {
    pub fn new(config: SessionConfig, service: Arc<dyn GenerationService>) -> Self {
        Self {
            config: Arc::new(config),
            service,
            next_id: 1,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<dyn GenerationService> {
        Arc::clone(&self.service)
    }

    /// Callers must only pass credentials that have passed validation.
    pub fn create(&mut self, credential: Credential) -> Session {
        debug_assert!(!credential.is_empty(), "sessions need a credential");
        let id = SessionId(self.next_id);
        self.next_id += 1;
        info!(session = %id, model = %self.config.model, "created chat session");
        Session {
            id,
            credential,
            config: Arc::clone(&self.config),
            service: Arc::clone(&self.service),
            history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::ScriptedService;

    fn factory() -> SessionFactory {
        SessionFactory::new(
            SessionConfig {
                model: "gemini-2.5-flash".into(),
                system_instruction: "You are Gee.".into(),
            },
            Arc::new(ScriptedService::new()),
        )
    }

    #[test]
    fn each_session_gets_a_new_id() {
        let mut factory = factory();
        let first = factory.create(Credential::new("good-key"));
        let second = factory.create(Credential::new("good-key"));
        assert!(second.id() > first.id());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn exchange_carries_binding_and_history() {
        let mut factory = factory();
        let mut session = factory.create(Credential::new("good-key"));
        session.record_exchange("hi", "hello there");

        let pending = session.exchange("next");
        assert_eq!(pending.message(), "next");
        assert_eq!(pending.request.model, "gemini-2.5-flash");
        assert_eq!(
            pending.request.system_instruction.as_deref(),
            Some("You are Gee.")
        );
        assert_eq!(
            pending.request.history,
            vec![Content::user("hi"), Content::model("hello there")]
        );
    }

    #[test]
    fn debug_hides_the_credential() {
        let mut factory = factory();
        let session = factory.create(Credential::new("good-key"));
        assert!(!format!("{session:?}").contains("good-key"));
    }
}
