use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::constants::PROBE_TEXT;
use crate::core::credential::Credential;
use crate::core::service::GenerationService;

/// Decides whether a credential is usable.
///
/// Network and authorization failures are deliberately indistinguishable to
/// callers: both yield `false`.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, credential: &Credential) -> bool;
}

/// Validates by sending one trivial generate-once request.
pub struct ProbeValidator {
    service: Arc<dyn GenerationService>,
    model: String,
}

impl ProbeValidator {
    pub fn new(service: Arc<dyn GenerationService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }
}

#[async_trait]
impl CredentialValidator for ProbeValidator {
    async fn validate(&self, credential: &Credential) -> bool {
        if credential.is_empty() {
            debug!("skipping probe for empty credential");
            return false;
        }

        match self
            .service
            .generate_once(credential, &self.model, PROBE_TEXT)
            .await
        {
            Ok(_) => {
                debug!(model = %self.model, "credential probe succeeded");
                true
            }
            Err(err) => {
                warn!(model = %self.model, "credential probe failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::ScriptedService;

    #[tokio::test]
    async fn empty_credential_is_invalid_without_a_network_call() {
        let service = Arc::new(ScriptedService::new());
        let validator = ProbeValidator::new(service.clone(), "gemini-2.5-flash");

        assert!(!validator.validate(&Credential::new("")).await);
        assert!(!validator.validate(&Credential::new("   ")).await);
        assert_eq!(service.probe_count(), 0);
    }

    #[tokio::test]
    async fn accepted_key_validates() {
        let service = Arc::new(ScriptedService::new().accept_key("good-key"));
        let validator = ProbeValidator::new(service.clone(), "gemini-2.5-flash");

        assert!(validator.validate(&Credential::new("good-key")).await);
        assert_eq!(service.probe_count(), 1);
        assert_eq!(service.probed_texts(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn rejected_key_is_invalid_after_one_probe() {
        let service = Arc::new(ScriptedService::new().accept_key("good-key"));
        let validator = ProbeValidator::new(service.clone(), "gemini-2.5-flash");

        assert!(!validator.validate(&Credential::new("bad-key")).await);
        assert_eq!(service.probe_count(), 1);
    }
}
