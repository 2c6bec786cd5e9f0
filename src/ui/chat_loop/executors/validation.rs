use std::sync::Arc;

use tracing::warn;

use crate::core::app::executors::{validate_credential, VALIDATION_ABORTED};
use crate::core::app::{AppAction, AppActionContext, AppActionDispatcher, ValidationRequest};
use crate::core::validator::CredentialValidator;

/// Probes the credential on a background task and posts the verdict.
///
/// A probe task that panics or is cancelled still answers its request, as
/// `ValidationFailed`, so the app never stays in `Validating`.
pub fn spawn_validation(
    dispatcher: AppActionDispatcher,
    validator: Arc<dyn CredentialValidator>,
    request: ValidationRequest,
) {
    let request_id = request.request_id;
    let probe = tokio::spawn(async move { validate_credential(validator.as_ref(), request).await });

    tokio::spawn(async move {
        let action = match probe.await {
            Ok(action) => action,
            Err(err) => {
                warn!(request_id, "validation task ended abnormally: {err}");
                AppAction::ValidationFailed {
                    request_id,
                    error: VALIDATION_ABORTED.to_string(),
                }
            }
        };
        dispatcher.dispatch(action, AppActionContext::now());
    });
}
