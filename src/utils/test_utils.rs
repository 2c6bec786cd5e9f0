use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;
use futures_util::StreamExt;

use crate::core::app::App;
use crate::core::config::Config;
use crate::core::credential::{Credential, CredentialStore, MemoryCredentialStore};
use crate::core::presence::IdlePresenceMonitor;
use crate::core::service::{FragmentStream, GenerationService, ServiceError, StreamRequest};
use crate::core::session::{SessionConfig, SessionFactory};

/// What the fake service does for the next opened stream.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Fragments(Vec<String>),
    FailAfter(Vec<String>, String),
    Refuse(String),
}

impl ScriptedReply {
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedReply::Fragments(fragments.into_iter().map(Into::into).collect())
    }

    pub fn fail_after<I, S>(fragments: I, reason: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedReply::FailAfter(
            fragments.into_iter().map(Into::into).collect(),
            reason.to_string(),
        )
    }

    pub fn refuse(reason: &str) -> Self {
        ScriptedReply::Refuse(reason.to_string())
    }
}

/// In-process [`GenerationService`] with scripted probe and stream results.
#[derive(Default)]
pub struct ScriptedService {
    accepted_keys: Vec<String>,
    replies: Mutex<VecDeque<ScriptedReply>>,
    probes: Mutex<Vec<String>>,
    streams: Mutex<Vec<StreamRequest>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept_key(mut self, key: &str) -> Self {
        self.accepted_keys.push(key.to_string());
        self
    }

    pub fn reply(self, reply: ScriptedReply) -> Self {
        self.push_reply(reply);
        self
    }

    pub fn push_reply(&self, reply: ScriptedReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }

    pub fn probed_texts(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    pub fn stream_requests(&self) -> Vec<StreamRequest> {
        self.streams.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate_once(
        &self,
        credential: &Credential,
        _model: &str,
        text: &str,
    ) -> Result<String, ServiceError> {
        self.probes.lock().unwrap().push(text.to_string());
        if self
            .accepted_keys
            .iter()
            .any(|key| key == credential.expose())
        {
            Ok("Hi!".to_string())
        } else {
            Err(ServiceError::Api {
                status: Some(400),
                message: "INVALID_ARGUMENT: API key not valid.".to_string(),
            })
        }
    }

    async fn open_stream(&self, request: StreamRequest) -> Result<FragmentStream, ServiceError> {
        self.streams.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Fragments(Vec::new()));

        match reply {
            ScriptedReply::Fragments(fragments) => {
                Ok(stream::iter(fragments.into_iter().map(Ok)).boxed())
            }
            ScriptedReply::FailAfter(fragments, reason) => {
                let items = fragments
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(ServiceError::Transport(reason))));
                Ok(stream::iter(items).boxed())
            }
            ScriptedReply::Refuse(reason) => Err(ServiceError::Transport(reason)),
        }
    }
}

pub fn create_test_app_with(
    service: Arc<ScriptedService>,
    stored: Option<Credential>,
) -> (App, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new(stored));
    let config = Config::default();
    let factory = SessionFactory::new(
        SessionConfig {
            model: config.model().to_string(),
            system_instruction: "You are Gee.".to_string(),
        },
        service,
    );
    let presence = IdlePresenceMonitor::new(config.idle_timeout(), std::time::Instant::now());
    let app = App::new(
        Arc::clone(&store) as Arc<dyn CredentialStore>,
        factory,
        presence,
        config,
        None,
    );
    (app, store)
}

pub fn create_test_app() -> App {
    create_test_app_with(Arc::new(ScriptedService::new()), None).0
}
