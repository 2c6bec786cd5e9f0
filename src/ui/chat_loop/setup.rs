use std::sync::Arc;

use tokio::sync::Mutex;

use super::AppHandle;

use crate::core::app::setup::{build_app, AppParts, StartupOptions};
use crate::core::validator::CredentialValidator;

/// Builds the shared app state for the chat loop along with the validator
/// its background probes run against.
pub fn bootstrap_app(
    options: StartupOptions,
) -> Result<(AppHandle, Arc<dyn CredentialValidator>), Box<dyn std::error::Error>> {
    let AppParts { app, validator } = build_app(options)?;
    Ok((AppHandle::new(Arc::new(Mutex::new(app))), validator))
}
