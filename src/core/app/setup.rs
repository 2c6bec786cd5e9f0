use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::core::app::App;
use crate::core::config::Config;
use crate::core::constants::API_KEY_ENV;
use crate::core::credential::{
    Credential, CredentialStore, KeyringCredentialStore, MemoryCredentialStore,
};
use crate::core::gemini::GeminiService;
use crate::core::presence::IdlePresenceMonitor;
use crate::core::prompt::SYSTEM_INSTRUCTION;
use crate::core::service::GenerationService;
use crate::core::session::{SessionConfig, SessionFactory};
use crate::core::validator::{CredentialValidator, ProbeValidator};

#[derive(Debug, Clone, Copy, Default)]
pub struct StartupOptions {
    /// Read the key from `GEMINI_API_KEY` and never touch the keyring.
    pub env_only: bool,
}

pub struct AppParts {
    pub app: App,
    pub validator: Arc<dyn CredentialValidator>,
}

/// Loads the config from its platform location and wires up the app.
pub fn build_app(options: StartupOptions) -> Result<AppParts, Box<dyn Error>> {
    let config_path = Config::config_path()?;
    let config = Config::load_from_path(&config_path)?;
    build_app_with(config, Some(config_path), options)
}

pub fn build_app_with(
    config: Config,
    config_path: Option<PathBuf>,
    options: StartupOptions,
) -> Result<AppParts, Box<dyn Error>> {
    let client = reqwest::Client::builder().build()?;
    let service: Arc<dyn GenerationService> =
        Arc::new(GeminiService::new(client, config.base_url()));
    debug!(base_url = config.base_url(), model = config.model(), "configured Gemini client");

    let validator: Arc<dyn CredentialValidator> =
        Arc::new(ProbeValidator::new(Arc::clone(&service), config.model()));
    let factory = SessionFactory::new(
        SessionConfig {
            model: config.model().to_string(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        },
        service,
    );
    let presence = IdlePresenceMonitor::new(config.idle_timeout(), Instant::now());
    let store = credential_store(options.env_only);

    Ok(AppParts {
        app: App::new(store, factory, presence, config, config_path),
        validator,
    })
}

pub fn credential_store(env_only: bool) -> Arc<dyn CredentialStore> {
    if env_only {
        let from_env = std::env::var(API_KEY_ENV)
            .ok()
            .map(Credential::new)
            .filter(|credential| !credential.is_empty());
        info!(found = from_env.is_some(), "using {API_KEY_ENV} instead of the keyring");
        Arc::new(MemoryCredentialStore::new(from_env))
    } else {
        Arc::new(KeyringCredentialStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ThemePreference;

    #[test]
    fn build_app_with_applies_config_overrides() {
        let config = Config {
            theme: ThemePreference::Light,
            model: Some("gemini-2.5-pro".into()),
            base_url: Some("http://127.0.0.1:9/v1beta".into()),
            idle_timeout_ms: Some(1_000),
        };
        let parts = build_app_with(config, None, StartupOptions { env_only: true })
            .expect("app should build");

        assert_eq!(parts.app.ui.theme, ThemePreference::Light);
        assert_eq!(parts.app.session.factory.config().model, "gemini-2.5-pro");
        assert_eq!(
            parts.app.presence.quiet_interval(),
            std::time::Duration::from_secs(1)
        );
        assert!(parts.app.current_session().is_none());
    }
}
